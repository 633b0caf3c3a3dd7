//! # Contact Repository
//!
//! Customers, delivery drivers and workers.
//!
//! Deliveries and workers share one shape ([`PersonRow`]); customers add
//! delivery fee, remark and price level.

use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{CustomerRow, Entity, NewContact, NewCustomer, PersonRow};

use crate::error::DbResult;

const CUSTOMER_SELECT: &str = "SELECT id, \
     strftime('%Y-%m-%d, %H:%M:%S', dateTime) AS date_time, \
     name, phoneNo AS phone_no, delFee AS del_fee, address, remark, \
     priceLevel AS price_level \
     FROM customers";

/// The two person tables with identical columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonTable {
    Delivery,
    Worker,
}

impl PersonTable {
    pub fn entity(&self) -> Entity {
        match self {
            PersonTable::Delivery => Entity::Delivery,
            PersonTable::Worker => Entity::Worker,
        }
    }

    pub fn table(&self) -> &'static str {
        self.entity().table()
    }

    fn select(&self) -> String {
        format!(
            "SELECT id, strftime('%Y-%m-%d, %H:%M:%S', dateTime) AS date_time, \
             name, phoneNo AS phone_no, address FROM {}",
            self.table()
        )
    }
}

/// Repository for customers, deliveries and workers.
#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    /// Creates a new ContactRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ContactRepository { pool }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn list_customers(&self) -> DbResult<Vec<CustomerRow>> {
        let sql = format!("{CUSTOMER_SELECT} ORDER BY id");
        let rows = sqlx::query_as::<_, CustomerRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed customers");
        Ok(rows)
    }

    pub async fn get_customer(&self, id: i64) -> DbResult<Option<CustomerRow>> {
        let sql = format!("{CUSTOMER_SELECT} WHERE id = ?");
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn insert_customer(&self, customer: &NewCustomer) -> DbResult<i64> {
        debug!(name = %customer.name, "Inserting customer");

        let result = sqlx::query(
            "INSERT INTO customers (name, phoneNo, delFee, address, remark, priceLevel) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.name)
        .bind(&customer.phone_no)
        .bind(customer.del_fee)
        .bind(&customer.address)
        .bind(&customer.remark)
        .bind(&customer.price_level)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    // =========================================================================
    // Deliveries and Workers
    // =========================================================================

    pub async fn list_people(&self, table: PersonTable) -> DbResult<Vec<PersonRow>> {
        let sql = format!("{} ORDER BY id", table.select());
        let rows = sqlx::query_as::<_, PersonRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(table = table.table(), count = rows.len(), "Listed contacts");
        Ok(rows)
    }

    pub async fn get_person(&self, table: PersonTable, id: i64) -> DbResult<Option<PersonRow>> {
        let sql = format!("{} WHERE id = ?", table.select());
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn insert_person(&self, table: PersonTable, person: &NewContact) -> DbResult<i64> {
        debug!(table = table.table(), name = %person.name, "Inserting contact");

        let sql = format!(
            "INSERT INTO {} (name, phoneNo, address) VALUES (?, ?, ?)",
            table.table()
        );
        let result = sqlx::query(&sql)
            .bind(&person.name)
            .bind(&person.phone_no)
            .bind(&person.address)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_customer_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let contacts = db.contacts();

        let id = contacts
            .insert_customer(&NewCustomer {
                name: "Omar".into(),
                phone_no: Some("0770".into()),
                del_fee: 2.5,
                address: None,
                remark: None,
                price_level: Some("Wholesale".into()),
            })
            .await
            .unwrap();

        let customer = contacts.get_customer(id).await.unwrap().unwrap();
        assert_eq!(customer.name, "Omar");
        assert_eq!(customer.del_fee, 2.5);
        assert_eq!(customer.date_time.len(), "2024-01-01, 00:00:00".len());
        assert_eq!(contacts.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_people_tables_are_separate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let contacts = db.contacts();

        let driver = NewContact {
            name: "Sam".into(),
            phone_no: None,
            address: Some("Erbil".into()),
        };
        let id = contacts
            .insert_person(PersonTable::Delivery, &driver)
            .await
            .unwrap();

        assert_eq!(contacts.list_people(PersonTable::Delivery).await.unwrap().len(), 1);
        assert!(contacts.list_people(PersonTable::Worker).await.unwrap().is_empty());

        let row = contacts
            .get_person(PersonTable::Delivery, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.address.as_deref(), Some("Erbil"));
        assert!(contacts
            .get_person(PersonTable::Worker, id)
            .await
            .unwrap()
            .is_none());
    }
}
