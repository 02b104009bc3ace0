use std::marker::PhantomData;

use crate::channel::Outbound;
use crate::error::StepError;
use crate::producer::Production;

/// [`Production`] assembled from a state value and two closures.
///
/// For producers simple enough not to warrant a named type: `produce`
/// advances the state and returns the next value, `handle` folds one
/// control message into the state (and may clear the outbound buffer
/// through the handle it is given).
pub struct Injected<St, M, T, F, H> {
    state: St,
    produce: F,
    handle: H,
    _types: PhantomData<fn() -> (M, T)>,
}

impl<St, M, T, F, H> Injected<St, M, T, F, H>
where
    F: FnMut(&mut St) -> Result<T, StepError>,
    H: FnMut(M, &mut St, &Outbound<T>) -> Result<(), StepError>,
{
    pub fn new(state: St, produce: F, handle: H) -> Self {
        Self {
            state,
            produce,
            handle,
            _types: PhantomData,
        }
    }
}

impl<St, M, T, F, H> Production for Injected<St, M, T, F, H>
where
    St: Send + 'static,
    M: Send + 'static,
    T: Send + 'static,
    F: FnMut(&mut St) -> Result<T, StepError> + Send + 'static,
    H: FnMut(M, &mut St, &Outbound<T>) -> Result<(), StepError> + Send + 'static,
{
    type Msg = M;
    type Output = T;

    fn handle_message(&mut self, msg: M, outbound: &Outbound<T>) -> Result<(), StepError> {
        (self.handle)(msg, &mut self.state, outbound)
    }

    fn production_step(&mut self) -> Result<T, StepError> {
        (self.produce)(&mut self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::{Producer, ProducerConfig};

    fn injected_counter(
        start: u64,
        buffer_size: usize,
    ) -> Producer<impl Production<Msg = u64, Output = u64>> {
        let injected = Injected::new(
            start,
            |i: &mut u64| {
                let next = *i;
                *i += 1;
                Ok(next)
            },
            |msg: u64, i: &mut u64, outbound: &Outbound<u64>| {
                *i = msg;
                outbound.clear();
                Ok(())
            },
        );
        let config = ProducerConfig {
            buffer_size: Some(buffer_size),
            ..Default::default()
        };
        Producer::with_config(injected, config).expect("valid buffer size")
    }

    #[tokio::test]
    async fn test_injected_counts_from_initial_state() {
        let mut producer = injected_counter(10, 1);
        producer.start().unwrap();

        for expected in 10..20 {
            assert_eq!(producer.get().await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_injected_state_reset() {
        let mut producer = injected_counter(10, 1);
        producer.start().unwrap();
        assert_eq!(producer.get().await.unwrap(), 10);

        producer.send(0);

        // Anything at or above the initial state predates the reset
        let mut value = producer.get().await.unwrap();
        while value >= 10 {
            value = producer.get().await.unwrap();
        }
        assert_eq!(value, 0);
        assert_eq!(producer.get().await.unwrap(), 1);
        assert_eq!(producer.get().await.unwrap(), 2);
    }
}
