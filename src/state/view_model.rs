//! View model for the main screen
//!
//! Owns the current dog and caption and is the only writer of both. The
//! fetch itself runs elsewhere: `request_new_dog` hands back a future and
//! the result comes back through `apply` on the UI thread.

use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use super::data::DogObject;
use super::observable::Observable;
use crate::error::FetchError;
use crate::net::DogSource;

pub struct ViewModel {
    source: Arc<dyn DogSource>,
    caption: Observable<String>,
    dog: Observable<Option<DogObject>>,
    errors: Observable<Option<FetchError>>,
}

impl ViewModel {
    pub fn new(source: Arc<dyn DogSource>) -> Self {
        Self {
            source,
            caption: Observable::default(),
            dog: Observable::default(),
            errors: Observable::default(),
        }
    }

    /// Caption of the most recent successful fetch ("" while one is pending)
    #[cfg(test)]
    pub fn caption(&self) -> &str {
        self.caption.get()
    }

    #[cfg(test)]
    pub fn dog(&self) -> Option<&DogObject> {
        self.dog.get().as_ref()
    }

    pub fn subscribe_caption(&mut self, f: impl FnMut(&String) + Send + 'static) {
        self.caption.subscribe(f);
    }

    pub fn subscribe_dog(&mut self, f: impl FnMut(&Option<DogObject>) + Send + 'static) {
        self.dog.subscribe(f);
    }

    pub fn subscribe_errors(&mut self, f: impl FnMut(&Option<FetchError>) + Send + 'static) {
        self.errors.subscribe(f);
    }

    /// Start a fetch cycle.
    ///
    /// Clears the caption right away and returns the fetch as a future the
    /// caller runs off the UI thread. Overlapping requests are neither
    /// merged nor cancelled: whichever result is applied last wins.
    pub fn request_new_dog(
        &mut self,
    ) -> impl Future<Output = Result<DogObject, FetchError>> + Send + 'static {
        self.caption.publish(String::new());

        let source = Arc::clone(&self.source);
        async move { source.fetch_random_dog().await }
    }

    /// Publish the outcome of a fetch started by `request_new_dog`.
    ///
    /// On success the caption goes out before the dog, so anything that
    /// reacts to the dog already knows its caption.
    pub fn apply(&mut self, result: Result<DogObject, FetchError>) {
        match result {
            Ok(dog) => {
                info!(url = %dog.img_url, "🐶 new dog");
                self.caption.publish(dog.phrase.clone());
                self.dog.publish(Some(dog));
            }
            Err(err) => {
                warn!(error = %err, "dog fetch failed");
                self.errors.publish(Some(err));
            }
        }
    }
}

impl std::fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModel")
            .field("caption", &self.caption)
            .field("dog", &self.dog)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Hands out canned results in order
    struct ScriptedSource {
        results: Mutex<VecDeque<Result<DogObject, FetchError>>>,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<DogObject, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
            })
        }
    }

    #[async_trait]
    impl DogSource for ScriptedSource {
        async fn fetch_random_dog(&self) -> Result<DogObject, FetchError> {
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Request("script exhausted".into())))
        }
    }

    fn record<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl FnMut(&T) + Send + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |value: &T| sink.lock().unwrap().push(value.clone()))
    }

    #[tokio::test]
    async fn test_success_publishes_caption_then_dog() {
        let dog = DogObject::new("https://x/dog.jpg", "Woof");
        let mut vm = ViewModel::new(ScriptedSource::new(vec![Ok(dog.clone())]));

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        vm.subscribe_caption(move |c| sink.lock().unwrap().push(format!("caption:{c}")));
        let sink = Arc::clone(&events);
        vm.subscribe_dog(move |d| {
            let url = d.as_ref().map(|d| d.img_url.clone()).unwrap_or_default();
            sink.lock().unwrap().push(format!("dog:{url}"));
        });

        let fetch = vm.request_new_dog();
        let result = fetch.await;
        vm.apply(result);

        assert_eq!(
            *events.lock().unwrap(),
            vec!["caption:", "caption:Woof", "dog:https://x/dog.jpg"]
        );
        assert_eq!(vm.caption(), "Woof");
        assert_eq!(vm.dog(), Some(&dog));
    }

    #[tokio::test]
    async fn test_failure_leaves_dog_untouched() {
        let first = DogObject::new("https://x/1.jpg", "um");
        let mut vm = ViewModel::new(ScriptedSource::new(vec![
            Ok(first.clone()),
            Err(FetchError::Status(500)),
        ]));

        let fetch = vm.request_new_dog();
        vm.apply(fetch.await);

        let (dogs, on_dog) = record::<Option<DogObject>>();
        vm.subscribe_dog(on_dog);
        let (errors, on_error) = record::<Option<FetchError>>();
        vm.subscribe_errors(on_error);

        let fetch = vm.request_new_dog();
        vm.apply(fetch.await);

        assert!(dogs.lock().unwrap().is_empty());
        assert_eq!(*errors.lock().unwrap(), vec![Some(FetchError::Status(500))]);
        assert_eq!(vm.dog(), Some(&first));
        assert_eq!(vm.caption(), "");
    }

    #[test]
    fn test_request_clears_caption_immediately() {
        let mut vm = ViewModel::new(ScriptedSource::new(vec![]));
        vm.apply(Ok(DogObject::new("https://x/dog.jpg", "Woof")));
        assert_eq!(vm.caption(), "Woof");

        // The future is never polled; clearing must not wait for it
        let _pending = vm.request_new_dog();
        assert_eq!(vm.caption(), "");
    }

    #[tokio::test]
    async fn test_overlapping_requests_last_applied_wins() {
        let older = DogObject::new("https://x/older.jpg", "older");
        let newer = DogObject::new("https://x/newer.jpg", "newer");
        let mut vm = ViewModel::new(ScriptedSource::new(vec![Ok(older.clone()), Ok(newer.clone())]));

        let first = vm.request_new_dog();
        let second = vm.request_new_dog();
        let first = first.await;
        let second = second.await;

        // The older request finishing late overwrites the newer one
        vm.apply(second);
        vm.apply(first);
        assert_eq!(vm.dog(), Some(&older));
        assert_eq!(vm.caption(), "older");
    }
}
