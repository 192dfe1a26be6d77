use dashmap::DashMap;
use uuid::Uuid;

/// Where a user currently is in a multi-step dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingQuantity {
        product_id: Uuid,
    },
    AwaitingDeliveryInfo,
    /// Delivery info is already HTML-escaped.
    AwaitingConfirmation {
        delivery_info: String,
    },
}

/// Process-local conversation state keyed by Telegram user id.
///
/// Nothing here survives a restart, and two bot instances would not share it.
#[derive(Debug, Default)]
pub struct ConversationStore {
    states: DashMap<i64, ConversationState>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: i64) -> ConversationState {
        self.states
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn set(&self, user_id: i64, state: ConversationState) {
        if state == ConversationState::Idle {
            self.states.remove(&user_id);
        } else {
            self.states.insert(user_id, state);
        }
    }

    pub fn clear(&self, user_id: i64) {
        self.states.remove(&user_id);
    }

    /// Removes and returns the current state, leaving the user idle.
    pub fn take(&self, user_id: i64) -> ConversationState {
        self.states
            .remove(&user_id)
            .map(|(_, state)| state)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
