//! Charge computation shared by quoting and committing a checkout.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Currency precision, in decimal places.
pub const MONEY_SCALE: u32 = 2;

pub const PAYMENT_METHOD_CARD: &str = "Card";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Standard,
    Express,
    NextDay,
}

impl ShippingMethod {
    pub const ALL: [ShippingMethod; 3] = [
        ShippingMethod::Standard,
        ShippingMethod::Express,
        ShippingMethod::NextDay,
    ];

    pub fn fee(&self) -> Decimal {
        match self {
            ShippingMethod::Standard => Decimal::ZERO,
            ShippingMethod::Express => Decimal::new(800, 2),
            ShippingMethod::NextDay => Decimal::new(1500, 2),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShippingMethod::Standard => "Standard",
            ShippingMethod::Express => "Express",
            ShippingMethod::NextDay => "Next-Day Delivery",
        }
    }

    /// Maps the legacy numeric fee encoding onto a tier: 0 is Standard, 8 is Express,
    /// any other positive fee is Next-Day. Negative fees have no tier. Only the tier is
    /// inferred; the fee itself is charged as given.
    pub fn from_fee(fee: Decimal) -> Option<Self> {
        if fee < Decimal::ZERO {
            None
        } else if fee.is_zero() {
            Some(ShippingMethod::Standard)
        } else if fee == Decimal::from(8) {
            Some(ShippingMethod::Express)
        } else {
            Some(ShippingMethod::NextDay)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingOption {
    pub method: ShippingMethod,
    pub label: String,
    #[schema(value_type = String)]
    pub fee: Decimal,
}

pub fn shipping_options() -> Vec<ShippingOption> {
    ShippingMethod::ALL
        .iter()
        .map(|method| ShippingOption {
            method: *method,
            label: method.label().to_string(),
            fee: method.fee(),
        })
        .collect()
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    round_money(Decimal::from(quantity) * unit_price)
}

pub fn subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    let sum = lines
        .into_iter()
        .fold(Decimal::ZERO, |acc, (quantity, price)| {
            acc + line_total(quantity, price)
        });
    round_money(sum)
}

pub fn tax(subtotal: Decimal, rate: Decimal) -> Decimal {
    round_money(subtotal * rate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charges {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
}

impl Charges {
    /// Charges for a quote: no shipping yet, so `total = subtotal + tax`.
    pub fn quote(subtotal: Decimal, rate: Decimal) -> Self {
        Self::with_shipping(subtotal, rate, Decimal::ZERO)
    }

    pub fn with_shipping(subtotal: Decimal, rate: Decimal, shipping_fee: Decimal) -> Self {
        let subtotal = round_money(subtotal);
        let tax = tax(subtotal, rate);
        let shipping_fee = round_money(shipping_fee);
        Self {
            subtotal,
            tax,
            shipping_fee,
            total: subtotal + shipping_fee + tax,
        }
    }
}
