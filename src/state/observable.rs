//! Observable value holder
//!
//! A value plus a list of subscribers that are called synchronously, in
//! subscription order, every time a new value is published. Publishing is
//! crate-private: the owner of the holder is the only writer.

/// Callback invoked with the freshly published value
pub type Subscriber<T> = Box<dyn FnMut(&T) + Send>;

pub struct Observable<T> {
    value: T,
    subscribers: Vec<Subscriber<T>>,
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            subscribers: Vec::new(),
        }
    }

    /// Current value
    #[cfg(test)]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Register a callback for future publishes.
    /// The current value is not replayed.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&T) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Replace the value and notify every subscriber before returning
    pub(crate) fn publish(&mut self, value: T) {
        self.value = value;
        for subscriber in &mut self.subscribers {
            subscriber(&self.value);
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
