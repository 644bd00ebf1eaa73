//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update the matching block here (or regenerate
//! it with `diesel print-schema`).

diesel::table! {
    /// Registered accounts, including credentials and balance.
    users (id) {
        id -> Int8,
        email -> Varchar,
        /// Argon2 PHC string.
        password -> Text,
        username -> Varchar,
        role -> Varchar,
        /// NUMERIC(12, 2), constrained to be non-negative.
        balance -> Numeric,
        avatar_url -> Nullable<Varchar>,
        full_name -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        country -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        birth_date -> Nullable<Date>,
        /// Bumped on logout and role change to revoke issued tokens.
        token_version -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue entries priced by checkout.
    products (id) {
        id -> Int8,
        title -> Varchar,
        price -> Numeric,
        discount_price -> Nullable<Numeric>,
        platform -> Varchar,
        category -> Varchar,
        rating -> Numeric,
        is_new -> Bool,
        is_popular -> Bool,
        is_on_sale -> Bool,
        seller_id -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Int8,
        user_id -> Int8,
        total_amount -> Numeric,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    order_items (id) {
        id -> Int8,
        order_id -> Int8,
        product_id -> Int8,
        quantity -> Int4,
        price_at_purchase -> Numeric,
    }
}

diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(order_items -> products (product_id));
diesel::joinable!(orders -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, products, orders, order_items);
