use chrono::Utc;

use crate::{
    entity::{addresses, credit_cards, order_items, orders, products, promotion_slots},
    models::{Address, Order, OrderItem, PaymentCard, Product, PromotionSlot, SectionType},
};

pub(crate) fn order_from_entity(model: orders::Model) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        user_email: model.user_email,
        address_id: model.address_id,
        subtotal: model.subtotal,
        shipping_fee: model.shipping_fee,
        tax: model.tax,
        total: model.total,
        shipping_method: model.shipping_method,
        payment_method: model.payment_method,
        shipping_status: model.shipping_status,
        courier: model.courier,
        tracking_number: model.tracking_number,
        remarks: model.remarks,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: order_items::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn product_from_entity(model: products::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        category: model.category,
        sub_category: model.sub_category,
        description: model.description,
        price: model.price,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn address_from_entity(model: addresses::Model) -> Address {
    Address {
        id: model.id,
        address_line: model.address_line,
        city: model.city,
        state: model.state,
        postal_code: model.postal_code,
    }
}

pub(crate) fn card_from_entity(model: credit_cards::Model) -> PaymentCard {
    PaymentCard {
        id: model.id,
        card_holder: model.card_holder,
        last4: model.last4,
        expiry_month: model.expiry_month,
        expiry_year: model.expiry_year,
        card_type: model.card_type,
    }
}

/// Rows with an unknown section are skipped rather than surfaced.
pub(crate) fn slot_from_entity(model: promotion_slots::Model) -> Option<PromotionSlot> {
    let section_type: SectionType = model.section_type.parse().ok()?;
    Some(PromotionSlot {
        image_url: format!("/api/promotions/{}/{}/image", section_type, model.id),
        id: model.id,
        section_type,
        name: model.name,
        category: model.category,
        sub_category: model.sub_category,
        description: model.description,
        price: model.price,
        image_mime_type: model.image_mime_type,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
