//! In-memory implementations of the storage ports.
//!
//! Used by integration tests and local runs without PostgreSQL. A single
//! mutex guards all state, so every ledger operation is atomic in the same
//! way the conditional SQL updates are.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    BalanceLedger, LedgerError, NewUser, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Cart, Email, Money, OrderId, PasswordHash, ProductId, ProfileChanges, Receipt, Role,
    SalesSummary, SignupCounts, StatsWindow, User, UserId, UserProfile,
};

/// Product price entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPrice {
    /// List price.
    pub price: Money,
    /// Sale price charged instead of `price` when set.
    pub discount_price: Option<Money>,
}

impl ProductPrice {
    fn effective(&self) -> Money {
        self.discount_price.unwrap_or(self.price)
    }
}

/// A completed order as recorded by checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    /// Order identifier.
    pub id: OrderId,
    /// Purchasing account.
    pub user_id: UserId,
    /// Amount debited.
    pub total: Money,
    /// `(product, quantity, unit price at purchase)`.
    pub items: Vec<(ProductId, u32, Money)>,
}

#[derive(Default)]
struct State {
    users: BTreeMap<i64, (User, PasswordHash)>,
    products: BTreeMap<i64, ProductPrice>,
    orders: Vec<OrderRecord>,
    next_user_id: i64,
    next_product_id: i64,
    next_order_id: i64,
}

impl State {
    fn next_user_id(&mut self) -> i64 {
        self.next_user_id += 1;
        self.next_user_id
    }

    fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id.get()).map(|(user, _)| user)
    }

    fn taken(
        &self,
        email: Option<&Email>,
        username: Option<&str>,
        except: Option<i64>,
    ) -> Option<UserPersistenceError> {
        self.users
            .values()
            .filter(|(user, _)| Some(user.id.get()) != except)
            .find_map(|(user, _)| {
                if email.is_some_and(|email| *email == user.email) {
                    Some(UserPersistenceError::duplicate_email())
                } else if username.is_some_and(|name| name == user.username.as_ref()) {
                    Some(UserPersistenceError::duplicate_username())
                } else {
                    None
                }
            })
    }

    fn apply_delta(&mut self, id: UserId, delta: Money) -> Result<Money, LedgerError> {
        let user = self.user_mut(id).ok_or_else(LedgerError::user_not_found)?;
        let next = user
            .balance
            .checked_add(delta)
            .ok_or_else(LedgerError::out_of_range)?;
        if next.is_negative() {
            return Err(LedgerError::insufficient_funds());
        }
        user.balance = next;
        Ok(next)
    }
}

/// Shared in-memory store implementing [`UserRepository`] and
/// [`BalanceLedger`].
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Empty store stamping rows with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a catalogue product and return its id.
    pub fn add_product(&self, price: Money, discount_price: Option<Money>) -> ProductId {
        let mut state = self.lock();
        state.next_product_id += 1;
        let id = state.next_product_id;
        state.products.insert(
            id,
            ProductPrice {
                price,
                discount_price,
            },
        );
        match ProductId::new(id) {
            Ok(product_id) => product_id,
            Err(error) => panic!("generated product id {id} is invalid: {error}"),
        }
    }

    /// Orders recorded for `user_id`, oldest first.
    pub fn orders_for(&self, user_id: UserId) -> Vec<OrderRecord> {
        self.lock()
            .orders
            .iter()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, new_user: &NewUser) -> Result<User, UserPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.lock();
        if let Some(conflict) = state.taken(
            Some(&new_user.email),
            Some(new_user.username.as_ref()),
            None,
        ) {
            return Err(conflict);
        }
        let raw_id = state.next_user_id();
        let id = UserId::new(raw_id)
            .map_err(|error| UserPersistenceError::query(error.to_string()))?;
        let user = User {
            id,
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            role: new_user.role,
            balance: new_user.balance,
            profile: UserProfile::default(),
            token_version: 0,
            created_at: now,
            updated_at: now,
        };
        state
            .users
            .insert(raw_id, (user.clone(), new_user.password_hash.clone()));
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.get(&id.get()).map(|(user, _)| user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|(user, _)| user.email == *email)
            .map(|(user, password_hash)| StoredCredentials {
                user: user.clone(),
                password_hash: password_hash.clone(),
            }))
    }

    async fn token_version(&self, id: UserId) -> Result<Option<i32>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .get(&id.get())
            .map(|(user, _)| user.token_version))
    }

    async fn update_profile(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.lock();
        if !state.users.contains_key(&id.get()) {
            return Ok(None);
        }
        if let Some(conflict) = state.taken(
            None,
            changes.username.as_ref().map(AsRef::as_ref),
            Some(id.get()),
        ) {
            return Err(conflict);
        }
        let Some(user) = state.user_mut(id) else {
            return Ok(None);
        };
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        let profile = &mut user.profile;
        let text_fields = [
            (&mut profile.full_name, &changes.full_name),
            (&mut profile.phone, &changes.phone),
            (&mut profile.bio, &changes.bio),
            (&mut profile.country, &changes.country),
            (&mut profile.city, &changes.city),
        ];
        for (stored, change) in text_fields {
            if let Some(value) = change {
                *stored = Some(value.clone());
            }
        }
        if let Some(birth_date) = changes.birth_date {
            profile.birth_date = Some(birth_date);
        }
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn update_avatar(
        &self,
        id: UserId,
        avatar_url: &str,
    ) -> Result<bool, UserPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.lock();
        Ok(state
            .user_mut(id)
            .map(|user| {
                user.profile.avatar_url = Some(avatar_url.to_owned());
                user.updated_at = now;
            })
            .is_some())
    }

    async fn bump_token_version(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock();
        Ok(state
            .user_mut(id)
            .map(|user| user.token_version += 1)
            .is_some())
    }

    async fn set_role(
        &self,
        id: UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.lock();
        Ok(state.user_mut(id).map(|user| {
            user.role = role;
            user.token_version += 1;
            user.updated_at = now;
            user.clone()
        }))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock();
        let removed = state.users.remove(&id.get()).is_some();
        if removed {
            state.orders.retain(|order| order.user_id != id);
        }
        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .map(|(user, _)| user.clone())
            .collect();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });
        Ok(users)
    }

    async fn signup_counts(
        &self,
        window: StatsWindow,
    ) -> Result<SignupCounts, UserPersistenceError> {
        let state = self.lock();
        let count_since = |since| {
            state
                .users
                .values()
                .filter(|(user, _)| user.created_at >= since)
                .count() as i64
        };
        Ok(SignupCounts {
            total: state.users.len() as i64,
            recent: count_since(window.active_since),
            today: count_since(window.today_start),
        })
    }
}

#[async_trait]
impl BalanceLedger for InMemoryStore {
    async fn adjust(&self, user_id: UserId, delta: Money) -> Result<Money, LedgerError> {
        self.lock().apply_delta(user_id, delta)
    }

    async fn set_absolute(&self, user_id: UserId, value: Money) -> Result<Money, LedgerError> {
        let mut state = self.lock();
        let user = state
            .user_mut(user_id)
            .ok_or_else(LedgerError::user_not_found)?;
        user.balance = value;
        Ok(value)
    }

    async fn checkout(&self, user_id: UserId, cart: &Cart) -> Result<Receipt, LedgerError> {
        let mut state = self.lock();
        let mut items = Vec::with_capacity(cart.lines().len());
        let mut total = Money::zero();
        for line in cart.lines() {
            let unit_price = state
                .products
                .get(&line.product_id.get())
                .map(ProductPrice::effective)
                .ok_or_else(|| LedgerError::product_not_found(line.product_id.get()))?;
            total = unit_price
                .checked_mul_quantity(line.quantity)
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(LedgerError::out_of_range)?;
            items.push((line.product_id, line.quantity, unit_price));
        }

        let debit =
            Money::try_from_decimal(-total.as_decimal()).map_err(|_| LedgerError::out_of_range())?;
        let new_balance = state.apply_delta(user_id, debit)?;

        state.next_order_id += 1;
        let order_id = OrderId::new(state.next_order_id);
        state.orders.push(OrderRecord {
            id: order_id,
            user_id,
            total,
            items,
        });
        Ok(Receipt {
            order_id,
            total,
            new_balance,
        })
    }

    async fn sales_summary(&self) -> Result<SalesSummary, LedgerError> {
        let state = self.lock();
        let revenue = state
            .orders
            .iter()
            .try_fold(Money::zero(), |sum, order| sum.checked_add(order.total))
            .ok_or_else(LedgerError::out_of_range)?;
        Ok(SalesSummary {
            products: state.products.len() as i64,
            orders: state.orders.len() as i64,
            revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::Username;
    use crate::test_support::{MutableClock, fixed_instant};
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new(Arc::new(MutableClock::new(fixed_instant())))
    }

    fn new_user(email: &str, username: &str, balance_minor: i64) -> NewUser {
        NewUser {
            email: Email::new(email).expect("email"),
            username: Username::new(username).expect("username"),
            password_hash: PasswordHash::new("digest"),
            role: Role::User,
            balance: Money::from_minor(balance_minor),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_and_username_are_distinguished(store: InMemoryStore) {
        store
            .create(&new_user("a@example.com", "alpha", 0))
            .await
            .expect("first");
        assert_eq!(
            store.create(&new_user("a@example.com", "other", 0)).await,
            Err(UserPersistenceError::duplicate_email())
        );
        assert_eq!(
            store.create(&new_user("b@example.com", "alpha", 0)).await,
            Err(UserPersistenceError::duplicate_username())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn failed_checkout_leaves_balance_and_orders_untouched(store: InMemoryStore) {
        let user = store
            .create(&new_user("c@example.com", "charlie", 10_000))
            .await
            .expect("user");
        let product = store.add_product(Money::from_minor(15_000), None);
        let cart = Cart::try_from_pairs([(product.get(), 1)]).expect("cart");

        assert_eq!(
            store.checkout(user.id, &cart).await,
            Err(LedgerError::insufficient_funds())
        );
        let balance = store.find_by_id(user.id).await.expect("lookup").map(|u| u.balance);
        assert_eq!(balance, Some(Money::from_minor(10_000)));
        assert!(store.orders_for(user.id).is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn role_change_bumps_token_version(store: InMemoryStore) {
        let user = store
            .create(&new_user("d@example.com", "delta", 0))
            .await
            .expect("user");
        store.set_role(user.id, Role::Seller).await.expect("role");
        assert_eq!(store.token_version(user.id).await, Ok(Some(1)));
    }

    #[rstest]
    #[tokio::test]
    async fn signup_counts_follow_creation_time() {
        let clock = Arc::new(MutableClock::new(fixed_instant()));
        let store = InMemoryStore::new(clock.clone());
        store
            .create(&new_user("old@example.com", "veteran", 0))
            .await
            .expect("old user");
        clock.advance_seconds(40 * 24 * 60 * 60);
        store
            .create(&new_user("mid@example.com", "regular", 0))
            .await
            .expect("recent user");
        clock.advance_seconds(24 * 60 * 60);
        store
            .create(&new_user("new@example.com", "rookie", 0))
            .await
            .expect("new user");

        let counts = store
            .signup_counts(StatsWindow::ending_at(clock.utc()))
            .await
            .expect("counts");
        assert_eq!(
            counts,
            SignupCounts {
                total: 3,
                recent: 2,
                today: 1,
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn sales_summary_totals_recorded_orders(store: InMemoryStore) {
        let user = store
            .create(&new_user("e@example.com", "echo", 100_000))
            .await
            .expect("user");
        let cheap = store.add_product(Money::from_minor(2_500), None);
        store.add_product(Money::from_minor(9_900), Some(Money::from_minor(4_900)));
        let cart = Cart::try_from_pairs([(cheap.get(), 2)]).expect("cart");
        store.checkout(user.id, &cart).await.expect("first order");
        store.checkout(user.id, &cart).await.expect("second order");

        let summary = store.sales_summary().await.expect("summary");
        assert_eq!(summary.products, 2);
        assert_eq!(summary.orders, 2);
        assert_eq!(summary.revenue, Money::from_minor(10_000));
    }
}
