//! InMemory Account Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;

use barcart_shared::protocol::MemberId;

use crate::domain::{Account, AccountRepository};

/// 起動時に登録したアカウントを保持する（実行中は変更しない）
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: HashMap<MemberId, Account>,
}

impl InMemoryAccountRepository {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.member_id, account))
                .collect(),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    async fn find_by_id(&self, member_id: MemberId) -> Option<Account> {
        self.accounts.get(&member_id).cloned()
    }
}
