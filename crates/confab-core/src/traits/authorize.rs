// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation authorization contract.
//!
//! Session and cookie verification live outside this service; Confab only
//! consumes a participant check before opening a stream or accepting an
//! action for a conversation.

use async_trait::async_trait;

use crate::error::ConfabError;

/// Decides whether a user may read from and act on a conversation.
#[async_trait]
pub trait ConversationAuthorizer: Send + Sync {
    async fn can_access_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<bool, ConfabError>;
}
