pub mod json_store;
pub mod kv;
pub mod ledger;
