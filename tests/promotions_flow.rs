mod common;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use common::{create_user, setup_state};
use rust_decimal::Decimal;
use storefront_checkout::{
    dto::promotions::CreatePromotionSlotRequest,
    error::AppError,
    models::{Role, SectionType},
    services::promotion_service,
};

const IMAGE: [u8; 4] = [0x89, b'P', b'N', b'G'];

fn slot(section_type: SectionType, name: &str) -> CreatePromotionSlotRequest {
    CreatePromotionSlotRequest {
        section_type,
        name: name.to_string(),
        category: "Music".into(),
        sub_category: "Jazz".into(),
        description: "Featured this week".into(),
        price: Decimal::new(1299, 2),
        image_base64: STANDARD.encode(IMAGE),
        image_mime_type: "image/png".into(),
    }
}

// Single test: it owns the promotion_slots table for its duration.
#[tokio::test]
async fn sections_never_exceed_capacity() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    sqlx::query("DELETE FROM promotion_slots")
        .execute(&state.pool)
        .await?;

    let admin = create_user(&state, Role::Admin).await?;
    let customer = create_user(&state, Role::Customer).await?;

    let err = promotion_service::insert_slot(&state, &customer, slot(SectionType::Carousel, "Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Sequential fill of the recommendation section.
    let first = promotion_service::insert_slot(&state, &admin, slot(SectionType::Recommendation, "One"))
        .await?
        .data
        .expect("slot")
        .id;
    promotion_service::insert_slot(&state, &admin, slot(SectionType::Recommendation, "Two")).await?;
    let err = promotion_service::insert_slot(&state, &admin, slot(SectionType::Recommendation, "Three"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::CapacityExceeded {
            section: SectionType::Recommendation
        }
    ));

    // Racing inserts into the carousel.
    let mut handles = Vec::new();
    for i in 0..8 {
        let state = state.clone();
        let admin = admin.clone();
        handles.push(tokio::spawn(async move {
            promotion_service::insert_slot(&state, &admin, slot(SectionType::Carousel, &format!("Slide {i}")))
                .await
        }));
    }
    let mut added = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => added += 1,
            Err(AppError::CapacityExceeded { section: SectionType::Carousel }) => full += 1,
            Err(other) => anyhow::bail!("unexpected insert error: {other}"),
        }
    }
    assert_eq!(added, 4);
    assert_eq!(full, 4);

    let sections = promotion_service::list_slots(&state).await?.data.expect("sections");
    assert_eq!(sections.carousel.len(), 4);
    assert_eq!(sections.recommendations.len(), 2);
    assert_eq!(sections.recommendations[0].name, "One");
    assert_eq!(
        sections.recommendations[0].image_url,
        format!("/api/promotions/Recommendation/{first}/image")
    );

    let image = promotion_service::slot_image(&state, SectionType::Recommendation, first).await?;
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.data, IMAGE.to_vec());
    let err = promotion_service::slot_image(&state, SectionType::Carousel, first)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Deleting under the wrong section leaves the slot alone.
    let removed = promotion_service::delete_slot(&state, &admin, SectionType::Carousel, first).await?;
    assert_eq!(removed.data.expect("count").removed, 0);

    let removed = promotion_service::delete_slot(&state, &admin, SectionType::Recommendation, first).await?;
    assert_eq!(removed.data.expect("count").removed, 1);
    let again = promotion_service::delete_slot(&state, &admin, SectionType::Recommendation, first).await?;
    assert_eq!(again.data.expect("count").removed, 0);

    // The freed slot can be reused.
    promotion_service::insert_slot(&state, &admin, slot(SectionType::Recommendation, "Four")).await?;

    Ok(())
}
