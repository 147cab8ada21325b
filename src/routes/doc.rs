use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartLine, CartList, RemoveCartItemsRequest, RemovedCount},
        checkout::{CommitRequest, Quote, QuoteLine, QuoteRequest},
        orders::{OrderList, OrderWithItems, SetStockRequest, UpdateShippingRequest},
        promotions::{CreatePromotionSlotRequest, PromotionSections, SlotCreated},
    },
    models::{
        Address, CartItem, Order, OrderItem, PaymentCard, Product, PromotionSlot, Role, SectionType,
    },
    pricing::{ShippingMethod, ShippingOption},
    response::{ApiResponse, Meta},
    routes::{admin, cart, checkout, employee, health, orders, params, promotions},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::remove_many,
        checkout::quote,
        checkout::commit,
        orders::list_orders,
        orders::get_order,
        employee::list_all_orders,
        employee::get_any_order,
        employee::update_shipping,
        employee::cancel_order,
        employee::set_stock,
        promotions::list_slots,
        promotions::slot_image,
        admin::insert_slot,
        admin::delete_slot
    ),
    components(
        schemas(
            Role,
            SectionType,
            ShippingMethod,
            ShippingOption,
            Product,
            CartItem,
            Order,
            OrderItem,
            Address,
            PaymentCard,
            PromotionSlot,
            AddToCartRequest,
            RemoveCartItemsRequest,
            RemovedCount,
            CartLine,
            CartList,
            QuoteRequest,
            QuoteLine,
            Quote,
            CommitRequest,
            OrderList,
            OrderWithItems,
            UpdateShippingRequest,
            SetStockRequest,
            CreatePromotionSlotRequest,
            PromotionSections,
            SlotCreated,
            params::Pagination,
            params::OrderListQuery,
            health::HealthData,
            Meta,
            ApiResponse<CartList>,
            ApiResponse<Quote>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<PromotionSections>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Cart", description = "Customer cart"),
        (name = "Checkout", description = "Quote and commit a selection of cart lines"),
        (name = "Orders", description = "Customer order history"),
        (name = "Employee", description = "Order fulfilment and stock"),
        (name = "Promotions", description = "Storefront featured items"),
        (name = "Admin", description = "Promotion slot management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
