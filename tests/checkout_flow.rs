mod common;

use common::{
    cart_line_ids, create_address, create_card, create_product, create_user, disable_user,
    line_for, setup_state, stock_of,
};
use rust_decimal::Decimal;
use storefront_checkout::{
    dto::{
        cart::{AddToCartRequest, RemoveCartItemsRequest},
        checkout::{CommitRequest, QuoteRequest},
        orders::{SetStockRequest, UpdateShippingRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Role,
    pricing::ShippingMethod,
    routes::params::{OrderListQuery, Pagination},
    services::{cart_service, checkout_service, employee_service, order_service},
    state::AppState,
};
use uuid::Uuid;

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

async fn add(state: &AppState, user: &AuthUser, product_id: Uuid, quantity: i32) -> Result<(), AppError> {
    cart_service::add_to_cart(state, user, AddToCartRequest { product_id, quantity }).await?;
    Ok(())
}

fn commit_request(line_ids: Vec<Uuid>, address_id: Uuid, card_id: Uuid) -> CommitRequest {
    CommitRequest {
        line_ids,
        address_id,
        card_id,
        shipping_method: Some(ShippingMethod::Express),
        shipping_fee: None,
    }
}

#[tokio::test]
async fn adding_twice_merges_into_one_line() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let product = create_product(&state, money(500), 10).await?;

    add(&state, &customer, product, 2).await?;
    add(&state, &customer, product, 3).await?;

    let cart = cart_service::list_cart(&state, &customer, Pagination::default()).await?;
    let items = cart.data.expect("cart").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
    assert_eq!(items[0].line_total, money(2500));

    // Merged quantity may not exceed stock; the line stays as it was.
    let err = add(&state, &customer, product, 6).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { product_id } if product_id == product));
    let cart = cart_service::list_cart(&state, &customer, Pagination::default()).await?;
    assert_eq!(cart.data.expect("cart").items[0].quantity, 5);

    let missing = add(&state, &customer, Uuid::new_v4(), 1).await.unwrap_err();
    assert!(matches!(missing, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn removing_lines_is_scoped_and_idempotent() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let alice = create_user(&state, Role::Customer).await?;
    let bob = create_user(&state, Role::Customer).await?;
    let product = create_product(&state, money(100), 10).await?;

    add(&state, &alice, product, 1).await?;
    add(&state, &bob, product, 1).await?;
    let alice_line = cart_line_ids(&state, &alice).await?[0];
    let bob_line = cart_line_ids(&state, &bob).await?[0];

    // Bob cannot remove Alice's line.
    let removed = cart_service::remove_from_cart(&state, &bob, alice_line).await?;
    assert_eq!(removed.data.expect("count").removed, 0);
    assert_eq!(cart_line_ids(&state, &alice).await?, vec![alice_line]);

    let removed = cart_service::remove_many(
        &state,
        &bob,
        RemoveCartItemsRequest {
            line_ids: vec![bob_line, bob_line, alice_line],
        },
    )
    .await?;
    assert_eq!(removed.data.expect("count").removed, 1);

    let again = cart_service::remove_from_cart(&state, &bob, bob_line).await?;
    assert_eq!(again.data.expect("count").removed, 0);

    Ok(())
}

#[tokio::test]
async fn quote_then_commit_only_the_selected_lines() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let address = create_address(&state, &customer).await?;
    let card = create_card(&state, &customer).await?;
    let book = create_product(&state, money(1000), 5).await?;
    let other = create_product(&state, money(700), 5).await?;

    add(&state, &customer, book, 2).await?;
    add(&state, &customer, other, 1).await?;
    let book_line = line_for(&state, &customer, book).await?;
    let other_line = line_for(&state, &customer, other).await?;

    let quote = checkout_service::quote(
        &state,
        &customer,
        QuoteRequest {
            line_ids: vec![book_line],
        },
    )
    .await?
    .data
    .expect("quote");
    assert_eq!(quote.items.len(), 1);
    assert!(quote.items[0].in_stock);
    assert_eq!(quote.subtotal, money(2000));
    assert_eq!(quote.tax, money(200));
    assert_eq!(quote.total, money(2200));
    assert_eq!(quote.addresses.len(), 1);
    assert_eq!(quote.cards[0].last4, "1111");
    assert_eq!(quote.shipping_options.len(), 3);

    let placed = checkout_service::commit(
        &state,
        &customer,
        commit_request(vec![book_line], address, card),
    )
    .await?
    .data
    .expect("order");

    assert_eq!(placed.order.subtotal, money(2000));
    assert_eq!(placed.order.tax, money(200));
    assert_eq!(placed.order.shipping_fee, money(800));
    assert_eq!(placed.order.total, money(3000));
    assert_eq!(placed.order.shipping_method, "Express");
    assert_eq!(placed.order.payment_method, "Card");
    assert_eq!(placed.order.shipping_status.as_deref(), Some("Pending"));
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].unit_price, money(1000));

    assert_eq!(cart_line_ids(&state, &customer).await?, vec![other_line]);
    assert_eq!(stock_of(&state, book).await?, 3);
    assert_eq!(stock_of(&state, other).await?, 5);

    let history = order_service::list_orders(&state, &customer, OrderListQuery::default()).await?;
    assert_eq!(history.data.expect("orders").items.len(), 1);

    let fetched = order_service::get_order(&state, &customer, placed.order.id).await?;
    assert_eq!(fetched.data.expect("order").items.len(), 1);

    // Committing the same selection again finds nothing left to buy.
    let err = checkout_service::commit(
        &state,
        &customer,
        commit_request(vec![book_line], address, card),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    Ok(())
}

#[tokio::test]
async fn quote_flags_lines_above_stock_and_rejects_empty_selection() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let employee = create_user(&state, Role::Employee).await?;
    let product = create_product(&state, money(250), 4).await?;

    add(&state, &customer, product, 4).await?;
    let line = cart_line_ids(&state, &customer).await?[0];

    employee_service::set_stock(&state, &employee, product, SetStockRequest { quantity: 1 }).await?;

    let quote = checkout_service::quote(&state, &customer, QuoteRequest { line_ids: vec![line] })
        .await?
        .data
        .expect("quote");
    assert!(!quote.items[0].in_stock);

    let err = checkout_service::quote(&state, &customer, QuoteRequest { line_ids: vec![] })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptySelection));

    let err = checkout_service::quote(
        &state,
        &customer,
        QuoteRequest {
            line_ids: vec![Uuid::new_v4()],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::EmptySelection));

    Ok(())
}

#[tokio::test]
async fn commit_fails_whole_when_any_line_lacks_stock() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let employee = create_user(&state, Role::Employee).await?;
    let address = create_address(&state, &customer).await?;
    let card = create_card(&state, &customer).await?;
    let plenty = create_product(&state, money(100), 10).await?;
    let scarce = create_product(&state, money(100), 3).await?;

    add(&state, &customer, plenty, 2).await?;
    add(&state, &customer, scarce, 3).await?;
    employee_service::set_stock(&state, &employee, scarce, SetStockRequest { quantity: 2 }).await?;

    let lines = cart_line_ids(&state, &customer).await?;
    let err = checkout_service::commit(&state, &customer, commit_request(lines.clone(), address, card))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { product_id } if product_id == scarce));

    assert_eq!(stock_of(&state, plenty).await?, 10);
    assert_eq!(stock_of(&state, scarce).await?, 2);
    assert_eq!(cart_line_ids(&state, &customer).await?, lines);

    Ok(())
}

#[tokio::test]
async fn concurrent_commits_never_oversell() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let product = create_product(&state, money(1500), 3).await?;

    let mut buyers = Vec::new();
    for _ in 0..2 {
        let customer = create_user(&state, Role::Customer).await?;
        let address = create_address(&state, &customer).await?;
        let card = create_card(&state, &customer).await?;
        add(&state, &customer, product, 2).await?;
        let lines = cart_line_ids(&state, &customer).await?;
        buyers.push((customer, commit_request(lines, address, card)));
    }

    let mut handles = Vec::new();
    for (customer, request) in buyers {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            checkout_service::commit(&state, &customer, request).await
        }));
    }

    let mut placed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => placed += 1,
            Err(AppError::InsufficientStock { product_id }) if product_id == product => rejected += 1,
            Err(other) => anyhow::bail!("unexpected commit error: {other}"),
        }
    }

    assert_eq!(placed, 1);
    assert_eq!(rejected, 1);
    assert_eq!(stock_of(&state, product).await?, 1);

    Ok(())
}

#[tokio::test]
async fn foreign_address_card_and_lines_are_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let alice = create_user(&state, Role::Customer).await?;
    let mallory = create_user(&state, Role::Customer).await?;
    let alice_address = create_address(&state, &alice).await?;
    let alice_card = create_card(&state, &alice).await?;
    let mallory_address = create_address(&state, &mallory).await?;
    let mallory_card = create_card(&state, &mallory).await?;
    let product = create_product(&state, money(100), 10).await?;

    add(&state, &alice, product, 1).await?;
    let alice_lines = cart_line_ids(&state, &alice).await?;

    let err = checkout_service::commit(
        &state,
        &mallory,
        commit_request(alice_lines.clone(), alice_address, mallory_card),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = checkout_service::commit(
        &state,
        &mallory,
        commit_request(alice_lines.clone(), mallory_address, alice_card),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = checkout_service::commit(
        &state,
        &mallory,
        commit_request(alice_lines.clone(), mallory_address, mallory_card),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    assert_eq!(cart_line_ids(&state, &alice).await?, alice_lines);
    assert_eq!(stock_of(&state, product).await?, 10);

    Ok(())
}

#[tokio::test]
async fn disabled_and_wrong_role_callers_are_forbidden() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let employee = create_user(&state, Role::Employee).await?;
    let product = create_product(&state, money(100), 10).await?;

    let err = add(&state, &employee, product, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = employee_service::list_all_orders(&state, &customer, OrderListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Order history belongs to customers only.
    let err = order_service::list_orders(&state, &employee, OrderListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = order_service::get_order(&state, &employee, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    disable_user(&state, &customer).await?;
    let err = add(&state, &customer, product, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = cart_service::list_cart(&state, &customer, Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn employee_ships_then_cancels_an_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let employee = create_user(&state, Role::Employee).await?;
    let address = create_address(&state, &customer).await?;
    let card = create_card(&state, &customer).await?;
    let product = create_product(&state, money(1250), 6).await?;

    add(&state, &customer, product, 4).await?;
    let lines = cart_line_ids(&state, &customer).await?;
    let placed = checkout_service::commit(&state, &customer, commit_request(lines, address, card))
        .await?
        .data
        .expect("order");
    assert_eq!(stock_of(&state, product).await?, 2);

    let updated = employee_service::update_shipping(
        &state,
        &employee,
        placed.order.id,
        UpdateShippingRequest {
            shipping_status: Some("Shipped".into()),
            courier: Some("FastPost".into()),
            tracking_number: Some("FP-42".into()),
            remarks: None,
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(updated.shipping_status.as_deref(), Some("Shipped"));
    assert_eq!(updated.courier.as_deref(), Some("FastPost"));
    assert_eq!(updated.total, placed.order.total);

    let shipped = employee_service::list_all_orders(
        &state,
        &employee,
        OrderListQuery {
            shipping_status: Some("Shipped".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("orders");
    assert!(shipped.items.iter().any(|o| o.id == placed.order.id));

    let cancelled = employee_service::cancel_order(&state, &employee, placed.order.id)
        .await?
        .data
        .expect("snapshot");
    assert_eq!(cancelled.items.len(), 1);
    assert_eq!(stock_of(&state, product).await?, 6);

    let err = order_service::get_order(&state, &customer, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = employee_service::cancel_order(&state, &employee, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn customers_cannot_read_each_others_orders() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let alice = create_user(&state, Role::Customer).await?;
    let bob = create_user(&state, Role::Customer).await?;
    let address = create_address(&state, &alice).await?;
    let card = create_card(&state, &alice).await?;
    let product = create_product(&state, money(300), 5).await?;

    add(&state, &alice, product, 1).await?;
    let lines = cart_line_ids(&state, &alice).await?;
    let placed = checkout_service::commit(&state, &alice, commit_request(lines, address, card))
        .await?
        .data
        .expect("order");

    let err = order_service::get_order(&state, &bob, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let bobs = order_service::list_orders(&state, &bob, OrderListQuery::default()).await?;
    assert!(bobs.data.expect("orders").items.is_empty());

    Ok(())
}

#[tokio::test]
async fn legacy_fee_is_charged_as_sent() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let address = create_address(&state, &customer).await?;
    let card = create_card(&state, &customer).await?;
    let product = create_product(&state, money(1000), 5).await?;

    add(&state, &customer, product, 1).await?;
    let lines = cart_line_ids(&state, &customer).await?;
    let request = CommitRequest {
        line_ids: lines,
        address_id: address,
        card_id: card,
        shipping_method: None,
        shipping_fee: Some(Decimal::from(20)),
    };
    let placed = checkout_service::commit(&state, &customer, request)
        .await?
        .data
        .expect("order");

    assert_eq!(placed.order.shipping_method, "Next-Day Delivery");
    assert_eq!(placed.order.shipping_fee, money(2000));
    assert_eq!(placed.order.tax, money(100));
    assert_eq!(placed.order.total, money(3100));

    Ok(())
}

#[tokio::test]
async fn concurrent_adds_merge_into_one_line() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let product = create_product(&state, money(100), 50).await?;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let state = state.clone();
        let customer = customer.clone();
        handles.push(tokio::spawn(async move {
            add(&state, &customer, product, 1).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let cart = cart_service::list_cart(&state, &customer, Pagination::default()).await?;
    let items = cart.data.expect("cart").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 16);
    assert_eq!(stock_of(&state, product).await?, 50);

    Ok(())
}

#[tokio::test]
async fn cancelling_a_multi_line_order_restores_every_product() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, Role::Customer).await?;
    let employee = create_user(&state, Role::Employee).await?;
    let address = create_address(&state, &customer).await?;
    let card = create_card(&state, &customer).await?;

    let mut products = Vec::new();
    for stock in [4, 5, 6] {
        let product = create_product(&state, money(200), stock).await?;
        add(&state, &customer, product, 2).await?;
        products.push((product, stock));
    }

    let lines = cart_line_ids(&state, &customer).await?;
    let placed = checkout_service::commit(&state, &customer, commit_request(lines, address, card))
        .await?
        .data
        .expect("order");

    // Items share one insert timestamp; the id breaks the tie.
    let fetched = employee_service::get_any_order(&state, &employee, placed.order.id)
        .await?
        .data
        .expect("order");
    let ids: Vec<Uuid> = fetched.items.iter().map(|item| item.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);

    employee_service::cancel_order(&state, &employee, placed.order.id).await?;
    for (product, stock) in products {
        assert_eq!(stock_of(&state, product).await?, stock);
    }

    Ok(())
}
