/// Two preconditions that resolve independently and in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyGate<A, B> {
    first: Option<A>,
    second: Option<B>,
}

impl<A, B> Default for ReadyGate<A, B> {
    fn default() -> Self {
        Self {
            first: None,
            second: None,
        }
    }
}

impl<A, B> ReadyGate<A, B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when this completed the gate.
    pub fn resolve_first(&mut self, value: A) -> bool {
        self.first = Some(value);
        self.is_ready()
    }

    pub fn resolve_second(&mut self, value: B) -> bool {
        self.second = Some(value);
        self.is_ready()
    }

    pub fn is_ready(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    pub fn ready(&self) -> Option<(&A, &B)> {
        Some((self.first.as_ref()?, self.second.as_ref()?))
    }

    /// Consumes both values if present; otherwise gives the gate back.
    pub fn take(self) -> Result<(A, B), Self> {
        match (self.first, self.second) {
            (Some(a), Some(b)) => Ok((a, b)),
            (first, second) => Err(Self { first, second }),
        }
    }
}
