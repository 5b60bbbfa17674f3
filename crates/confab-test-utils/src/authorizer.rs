// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static [`ConversationAuthorizer`] for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use confab_core::{ConfabError, ConversationAuthorizer};

/// Authorizer backed by an explicit membership set.
///
/// Unknown pairs are denied, so tests exercise the fail-closed path by
/// default.
#[derive(Default)]
pub struct StaticAuthorizer {
    members: Mutex<HashSet<(String, String)>>,
}

impl StaticAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `user_id` access to `conversation_id`.
    pub fn allow(&self, user_id: &str, conversation_id: &str) {
        self.members
            .lock()
            .unwrap()
            .insert((user_id.to_string(), conversation_id.to_string()));
    }
}

#[async_trait]
impl ConversationAuthorizer for StaticAuthorizer {
    async fn can_access_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<bool, ConfabError> {
        let key = (user_id.to_string(), conversation_id.to_string());
        Ok(self.members.lock().unwrap().contains(&key))
    }
}
