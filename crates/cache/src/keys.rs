//! Cache key scheme.
//!
//! Point lookups live under `account:*`, list pages under `accounts:*`.
//! Page keys embed the window so each page is cached on its own.

use ledger_core::Page;
use uuid::Uuid;

pub const ACTIVE_ACCOUNTS: &str = "accounts:active";
pub const ALL_ACCOUNTS_PATTERN: &str = "accounts:all:*";

pub fn account_by_id(id: Uuid) -> String {
    format!("account:id:{id}")
}

pub fn account_by_number(number: &str) -> String {
    format!("account:number:{number}")
}

pub fn user_accounts(user_id: Uuid, page: Page) -> String {
    let page = page.normalized();
    format!("accounts:user:{user_id}:{}:{}", page.limit, page.offset)
}

pub fn user_accounts_pattern(user_id: Uuid) -> String {
    format!("accounts:user:{user_id}:*")
}

pub fn all_accounts(page: Page) -> String {
    let page = page.normalized();
    format!("accounts:all:{}:{}", page.limit, page.offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::glob_match;

    #[test]
    fn test_page_keys_match_their_patterns() {
        let user = Uuid::new_v4();
        let key = user_accounts(user, Page::new(20, 40));
        assert_eq!(key, format!("accounts:user:{user}:20:40"));
        assert!(glob_match(&user_accounts_pattern(user), &key).unwrap());
        assert!(!glob_match(&user_accounts_pattern(Uuid::new_v4()), &key).unwrap());

        assert!(glob_match(ALL_ACCOUNTS_PATTERN, &all_accounts(Page::default())).unwrap());
        assert!(!glob_match(ALL_ACCOUNTS_PATTERN, ACTIVE_ACCOUNTS).unwrap());
    }

    #[test]
    fn test_page_keys_use_clamped_window() {
        let user = Uuid::new_v4();
        let unclamped = Page { limit: 0, offset: 3 };
        assert_eq!(user_accounts(user, unclamped), user_accounts(user, Page::new(1, 3)));
        assert_eq!(
            all_accounts(Page { limit: 5000, offset: 0 }),
            all_accounts(Page::new(100, 0))
        );
    }

    #[test]
    fn test_point_keys_are_disjoint() {
        let id = Uuid::new_v4();
        assert_ne!(account_by_id(id), account_by_number(&id.to_string()));
    }
}
