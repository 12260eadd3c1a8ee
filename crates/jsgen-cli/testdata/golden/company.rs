//! Types generated for `models`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub address: AddressObject,
    pub employees: Vec<serde_json::Value>,
    pub founded: i64,
    pub name: String,
    pub owner: Person,
    pub revenue: rust_decimal::Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressObject {
    pub street: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub active: bool,
    pub age: i64,
    pub email: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub name: String,
}
