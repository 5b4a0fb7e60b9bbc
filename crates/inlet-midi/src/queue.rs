//! Lock-free hand-off of dispatched messages to a synthesis thread.

use crate::message::MidiMessage;
use crate::receiver::MessageReceiver;
use parking_lot::Mutex;
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::trace;

const DEFAULT_CAPACITY: usize = 256;

/// Receiver side -- installed as the [`MessageReceiver`] of a dispatch path.
///
/// The hardware and virtual-port paths may share one queue, so the producer
/// sits behind a mutex. The consumer side stays lock-free.
pub struct QueueReceiver {
    producer: Mutex<HeapProd<MidiMessage>>,
    active: AtomicBool,
    overflowed: AtomicU64,
}

impl QueueReceiver {
    /// Last state announced by the virtual port.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Messages dropped because the buffer was full.
    #[inline]
    pub fn overflowed(&self) -> u64 {
        self.overflowed.load(Ordering::Relaxed)
    }
}

impl MessageReceiver for QueueReceiver {
    fn on_message(&self, message: &MidiMessage) {
        if self.producer.lock().try_push(message.clone()).is_err() {
            self.overflowed.fetch_add(1, Ordering::Relaxed);
            trace!("message queue full, dropping {:02x?}", message.as_bytes());
        }
    }

    fn on_active_state_changed(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }
}

/// Consumer side -- drain messages from the synthesis thread.
pub struct MessageConsumer {
    consumer: HeapCons<MidiMessage>,
}

impl MessageConsumer {
    #[inline]
    pub fn pop(&mut self) -> Option<MidiMessage> {
        self.consumer.try_pop()
    }

    pub fn drain_all(&mut self) -> Vec<MidiMessage> {
        let count = self.consumer.occupied_len();
        let mut messages = Vec::with_capacity(count);
        while let Some(message) = self.consumer.try_pop() {
            messages.push(message);
        }
        messages
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.consumer.is_empty()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.consumer.occupied_len()
    }
}

pub fn message_queue() -> (QueueReceiver, MessageConsumer) {
    message_queue_with_capacity(DEFAULT_CAPACITY)
}

/// A `capacity` of zero is raised to one.
pub fn message_queue_with_capacity(capacity: usize) -> (QueueReceiver, MessageConsumer) {
    let rb = HeapRb::new(capacity.max(1));
    let (producer, consumer) = rb.split();
    (
        QueueReceiver {
            producer: Mutex::new(producer),
            active: AtomicBool::new(false),
            overflowed: AtomicU64::new(0),
        },
        MessageConsumer { consumer },
    )
}
