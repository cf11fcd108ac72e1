//! Typed view of the `Order` record.
//!
//! The builder works on any [`RecordSchema`](crate::RecordSchema); this module
//! gives the one schema shipped with the binaries a strongly typed form, with
//! each enum field mapped to a Rust enum through a fixed symbol table.

use crate::schema::{Result, SchemaError};
use crate::values::{Record, Value};
use std::fmt;
use std::str::FromStr;

/// Payment method symbols of the `PaymentMethod` Avro enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    Cash,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::CreditCard,
        PaymentMethod::Paypal,
        PaymentMethod::Cash,
        PaymentMethod::Other,
    ];

    pub fn as_symbol(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::Paypal => "PAYPAL",
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Other => "OTHER",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CREDIT_CARD" => Ok(PaymentMethod::CreditCard),
            "PAYPAL" => Ok(PaymentMethod::Paypal),
            "CASH" => Ok(PaymentMethod::Cash),
            "OTHER" => Ok(PaymentMethod::Other),
            other => Err(SchemaError::InvalidValue {
                field: "payment_method".to_string(),
                message: format!("unknown symbol '{other}'"),
            }),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Lifecycle symbols of the `OrderStatus` Avro enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_symbol(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(SchemaError::InvalidValue {
                field: "order_status".to_string(),
                message: format!("unknown symbol '{other}'"),
            }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// An order as described by `schemas/order.avsc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub nationality: Option<String>,
    pub email: String,
    pub total_price: f32,
    pub product: Option<String>,
    pub quantity: Option<i32>,
    pub discount: Option<i32>,
    pub is_gift: bool,
    pub currency: String,
    pub payment_method: Option<PaymentMethod>,
    pub order_status: OrderStatus,
}

impl TryFrom<&Record> for Order {
    type Error = SchemaError;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Order {
            id: required_string(record, "id")?,
            customer_name: required_string(record, "customer_name")?,
            nationality: optional_string(record, "nationality")?,
            email: required_string(record, "email")?,
            total_price: match field(record, "total_price")? {
                Value::Float(f) => *f,
                other => return Err(unexpected("total_price", other)),
            },
            product: optional_string(record, "product")?,
            quantity: optional_int(record, "quantity")?,
            discount: optional_int(record, "discount")?,
            is_gift: match field(record, "is_gift")? {
                Value::Boolean(b) => *b,
                other => return Err(unexpected("is_gift", other)),
            },
            currency: required_string(record, "currency")?,
            payment_method: match field(record, "payment_method")? {
                Value::Null => None,
                Value::Enum(symbol) => Some(symbol.parse()?),
                other => return Err(unexpected("payment_method", other)),
            },
            order_status: match field(record, "order_status")? {
                Value::Enum(symbol) => symbol.parse()?,
                other => return Err(unexpected("order_status", other)),
            },
        })
    }
}

impl From<&Order> for Record {
    fn from(order: &Order) -> Self {
        fn opt_string(v: &Option<String>) -> Value {
            v.clone().map(Value::String).unwrap_or(Value::Null)
        }
        fn opt_int(v: Option<i32>) -> Value {
            v.map(Value::Int).unwrap_or(Value::Null)
        }

        Record::from_fields(
            "com.example.kafka.Order",
            vec![
                ("id".to_string(), Value::String(order.id.clone())),
                (
                    "customer_name".to_string(),
                    Value::String(order.customer_name.clone()),
                ),
                ("nationality".to_string(), opt_string(&order.nationality)),
                ("email".to_string(), Value::String(order.email.clone())),
                ("total_price".to_string(), Value::Float(order.total_price)),
                ("product".to_string(), opt_string(&order.product)),
                ("quantity".to_string(), opt_int(order.quantity)),
                ("discount".to_string(), opt_int(order.discount)),
                ("is_gift".to_string(), Value::Boolean(order.is_gift)),
                ("currency".to_string(), Value::String(order.currency.clone())),
                (
                    "payment_method".to_string(),
                    order
                        .payment_method
                        .map(|p| Value::Enum(p.as_symbol().to_string()))
                        .unwrap_or(Value::Null),
                ),
                (
                    "order_status".to_string(),
                    Value::Enum(order.order_status.as_symbol().to_string()),
                ),
            ],
        )
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order {} for {} ({:.2} {}, {})",
            self.id, self.customer_name, self.total_price, self.currency, self.order_status
        )
    }
}

fn field<'a>(record: &'a Record, name: &str) -> Result<&'a Value> {
    record
        .get(name)
        .ok_or_else(|| SchemaError::MissingField(name.to_string()))
}

fn unexpected(name: &str, value: &Value) -> SchemaError {
    SchemaError::InvalidValue {
        field: name.to_string(),
        message: format!("unexpected {} value", value.kind()),
    }
}

fn required_string(record: &Record, name: &str) -> Result<String> {
    match field(record, name)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(unexpected(name, other)),
    }
}

fn optional_string(record: &Record, name: &str) -> Result<Option<String>> {
    match field(record, name)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(unexpected(name, other)),
    }
}

fn optional_int(record: &Record, name: &str) -> Result<Option<i32>> {
    match field(record, name)? {
        Value::Null => Ok(None),
        Value::Int(i) => Ok(Some(*i)),
        other => Err(unexpected(name, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecordSchema;

    fn sample_order() -> Order {
        Order {
            id: "A1".to_string(),
            customer_name: "Ana".to_string(),
            nationality: None,
            email: "ana@example.com".to_string(),
            total_price: 19.99,
            product: Some("Lamp".to_string()),
            quantity: Some(2),
            discount: None,
            is_gift: true,
            currency: "EUR".to_string(),
            payment_method: Some(PaymentMethod::Paypal),
            order_status: OrderStatus::Shipped,
        }
    }

    #[test]
    fn test_symbols_match_schema() {
        let schema = RecordSchema::order().unwrap();
        let payment: Vec<&str> = PaymentMethod::ALL.iter().map(|p| p.as_symbol()).collect();
        let status: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_symbol()).collect();

        assert_eq!(
            schema.field("payment_method").unwrap().enum_symbols().unwrap(),
            payment.as_slice()
        );
        assert_eq!(
            schema.field("order_status").unwrap().enum_symbols().unwrap(),
            status.as_slice()
        );
    }

    #[test]
    fn test_symbol_parsing() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_symbol().parse::<PaymentMethod>().unwrap(), method);
        }
        for status in OrderStatus::ALL {
            assert_eq!(status.as_symbol().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_record_fields_follow_schema() {
        let schema = RecordSchema::order().unwrap();
        let record = Record::from(&sample_order());
        let names: Vec<&str> = record.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, schema.field_names());
        assert_eq!(record.schema_name(), schema.full_name());
    }

    #[test]
    fn test_order_from_record() {
        let order = sample_order();
        let record = Record::from(&order);
        assert_eq!(Order::try_from(&record).unwrap(), order);
    }

    #[test]
    fn test_is_gift_is_carried() {
        let record = Record::from(&sample_order());
        assert_eq!(record.get("is_gift"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_order_from_record_wrong_type() {
        let mut fields = Record::from(&sample_order()).fields().to_vec();
        fields[4].1 = Value::String("free".to_string());
        let record = Record::from_fields("com.example.kafka.Order", fields);

        let err = Order::try_from(&record).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { field, .. } if field == "total_price"));
    }
}
