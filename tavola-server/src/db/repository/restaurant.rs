//! Restaurant Repository

use super::{RepoError, RepoResult};
use shared::models::{
    Coupon, Restaurant, RestaurantCreate, RestaurantHighlight, RestaurantUpdate,
    RestaurantWithCoupons, SpecialMenu, SpecialMenuOffer,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const RESTAURANT_SELECT: &str = "SELECT id, owner_id, name, location, cuisine, rating, address, lat, lng, opening_hours, contact, created_at, updated_at FROM restaurants";

const SPECIAL_MENU_SELECT: &str = "SELECT id, restaurant_id, name, description, original_price, discounted_price, discount_percentage, photo_url, availability, created_at FROM special_menus";

const COUPON_SELECT: &str = "SELECT id, restaurant_id, description, discount_percentage, required_points, created_at FROM coupons";

/// Whitelisted listing filters; anything else in the query string is ignored
#[derive(Debug, Clone, Default)]
pub struct RestaurantFilter {
    pub name: Option<String>,
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let sql = format!("{} WHERE id = ?", RESTAURANT_SELECT);
    let row = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    owner_id: i64,
    data: &RestaurantCreate,
) -> RepoResult<Restaurant> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO restaurants (owner_id, name, location, cuisine, address, lat, lng, opening_hours, contact, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) RETURNING id",
    )
    .bind(owner_id)
    .bind(&data.name)
    .bind(&data.location)
    .bind(&data.cuisine)
    .bind(&data.address)
    .bind(data.lat)
    .bind(data.lng)
    .bind(&data.opening_hours)
    .bind(&data.contact)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create restaurant".into()))
}

/// Patch update over a fixed field list, scoped to the owning owner.
///
/// A missing row and a row owned by someone else are indistinguishable
/// to the caller.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
    data: &RestaurantUpdate,
) -> RepoResult<Restaurant> {
    let now = shared::util::now_millis();
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE restaurants SET ");
    let mut fields = qb.separated(", ");
    if let Some(name) = &data.name {
        fields.push("name = ").push_bind_unseparated(name.clone());
    }
    if let Some(location) = &data.location {
        fields
            .push("location = ")
            .push_bind_unseparated(location.clone());
    }
    if let Some(cuisine) = &data.cuisine {
        fields
            .push("cuisine = ")
            .push_bind_unseparated(cuisine.clone());
    }
    if let Some(rating) = data.rating {
        fields.push("rating = ").push_bind_unseparated(rating);
    }
    if let Some(address) = &data.address {
        fields
            .push("address = ")
            .push_bind_unseparated(address.clone());
    }
    if let Some(lat) = data.lat {
        fields.push("lat = ").push_bind_unseparated(lat);
    }
    if let Some(lng) = data.lng {
        fields.push("lng = ").push_bind_unseparated(lng);
    }
    if let Some(opening_hours) = &data.opening_hours {
        fields
            .push("opening_hours = ")
            .push_bind_unseparated(opening_hours.clone());
    }
    if let Some(contact) = &data.contact {
        fields
            .push("contact = ")
            .push_bind_unseparated(contact.clone());
    }
    fields.push("updated_at = ").push_bind_unseparated(now);
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" AND owner_id = ").push_bind(owner_id);

    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(
            "Restaurant not found or not authorized".into(),
        ));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Restaurant {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64, owner_id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn verify_ownership(
    pool: &SqlitePool,
    restaurant_id: i64,
    owner_id: i64,
) -> RepoResult<bool> {
    let row: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM restaurants WHERE id = ? AND owner_id = ?")
            .bind(restaurant_id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

// ── Filtered listing ─────────────────────────────────────────

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &RestaurantFilter) {
    if let Some(name) = &filter.name {
        qb.push(" AND name LIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(cuisine) = &filter.cuisine {
        qb.push(" AND cuisine = ").push_bind(cuisine.clone());
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location LIKE ")
            .push_bind(format!("%{location}%"));
    }
    if let Some(min_rating) = filter.min_rating {
        qb.push(" AND rating >= ").push_bind(min_rating);
    }
}

pub async fn find_filtered(
    pool: &SqlitePool,
    filter: &RestaurantFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Restaurant>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("{} WHERE 1 = 1", RESTAURANT_SELECT));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY rating DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let rows = qb.build_query_as::<Restaurant>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn count_filtered(pool: &SqlitePool, filter: &RestaurantFilter) -> RepoResult<i64> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM restaurants WHERE 1 = 1");
    push_filters(&mut qb, filter);
    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

// ── Trending / discounted feeds ──────────────────────────────

async fn latest_special_menu(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Option<SpecialMenu>> {
    let sql = format!(
        "{} WHERE restaurant_id = ? ORDER BY id DESC LIMIT 1",
        SPECIAL_MENU_SELECT
    );
    let row = sqlx::query_as::<_, SpecialMenu>(&sql)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn latest_coupon(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Option<Coupon>> {
    let sql = format!(
        "{} WHERE restaurant_id = ? ORDER BY id DESC LIMIT 1",
        COUPON_SELECT
    );
    let row = sqlx::query_as::<_, Coupon>(&sql)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Top-rated restaurants, each with its latest special menu and coupon
pub async fn find_trending(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<RestaurantHighlight>> {
    let sql = format!(
        "{} ORDER BY rating DESC, id DESC LIMIT ? OFFSET ?",
        RESTAURANT_SELECT
    );
    let restaurants = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let mut highlights = Vec::with_capacity(restaurants.len());
    for restaurant in restaurants {
        let special_menus = latest_special_menu(pool, restaurant.id).await?;
        let coupons = latest_coupon(pool, restaurant.id).await?;
        highlights.push(RestaurantHighlight {
            restaurant,
            special_menus,
            coupons,
        });
    }
    Ok(highlights)
}

pub async fn count_all(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Latest special menus joined with their restaurant
pub async fn find_discounted(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<SpecialMenuOffer>> {
    let sql = format!(
        "{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SPECIAL_MENU_SELECT
    );
    let menus = sqlx::query_as::<_, SpecialMenu>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let mut offers = Vec::with_capacity(menus.len());
    for special_menu in menus {
        let restaurant = find_by_id(pool, special_menu.restaurant_id)
            .await?
            .ok_or_else(|| {
                RepoError::Database(format!(
                    "Special menu {} references missing restaurant",
                    special_menu.id
                ))
            })?;
        offers.push(SpecialMenuOffer {
            special_menu,
            restaurant,
        });
    }
    Ok(offers)
}

pub async fn count_special_menus(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM special_menus")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Restaurants where the user holds purchased coupons, with those
/// coupons and the restaurant's special menus
pub async fn find_with_purchased_coupons(
    pool: &SqlitePool,
    user_id: i64,
) -> RepoResult<Vec<RestaurantWithCoupons>> {
    let sql = format!(
        "{} WHERE id IN (SELECT c.restaurant_id FROM coupons c JOIN purchased_coupons pc ON pc.coupon_id = c.id WHERE pc.user_id = ?) ORDER BY id",
        RESTAURANT_SELECT
    );
    let restaurants = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    let coupon_sql = "SELECT c.id, c.restaurant_id, c.description, c.discount_percentage, c.required_points, c.created_at FROM coupons c JOIN purchased_coupons pc ON pc.coupon_id = c.id WHERE pc.user_id = ? AND c.restaurant_id = ? ORDER BY c.id";
    let menus_sql = format!("{} WHERE restaurant_id = ? ORDER BY id", SPECIAL_MENU_SELECT);

    let mut result = Vec::with_capacity(restaurants.len());
    for restaurant in restaurants {
        let coupons = sqlx::query_as::<_, Coupon>(coupon_sql)
            .bind(user_id)
            .bind(restaurant.id)
            .fetch_all(pool)
            .await?;
        let special_menus = sqlx::query_as::<_, SpecialMenu>(&menus_sql)
            .bind(restaurant.id)
            .fetch_all(pool)
            .await?;
        result.push(RestaurantWithCoupons {
            restaurant,
            coupons,
            special_menus,
        });
    }
    Ok(result)
}
