//! The module contains `Plant` struct: one stock line of the nursery,
//! identified by `(name, spec, unit)`.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{EngineError, MoneyCents, Quantity, ResultEngine, quantity::div_round_half_up};

/// Stock level below which a plant counts as low (50 units).
pub const LOW_STOCK_THRESHOLD: Quantity = Quantity::units(50);

/// A nursery stock line.
///
/// `price` is the weighted-average unit cost of everything received so far.
#[derive(Clone, Debug, PartialEq)]
pub struct Plant {
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
    pub spec: String,
    pub unit: String,
    pub quantity: Quantity,
    pub price: MoneyCents,
    pub location: Option<String>,
    pub remark: Option<String>,
    pub create_at: DateTime<Utc>,
    pub update_at: DateTime<Utc>,
}

impl Plant {
    /// Merge an inbound delivery into this stock line.
    ///
    /// The unit price becomes `(old_qty*old_price + qty*price) / (old_qty + qty)`
    /// rounded half up to the cent. An empty line simply takes the new price.
    pub fn receive(&mut self, quantity: Quantity, price: MoneyCents) -> ResultEngine<()> {
        if !quantity.is_positive() {
            return Err(EngineError::InvalidAmount("quantity must be > 0".to_string()));
        }
        let total_qty = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| EngineError::InvalidAmount("quantity too large".to_string()))?;

        self.price = if self.quantity.hundredths() <= 0 {
            price
        } else {
            let old_value =
                i128::from(self.quantity.hundredths()) * i128::from(self.price.cents());
            let new_value = i128::from(quantity.hundredths()) * i128::from(price.cents());
            let avg = div_round_half_up(old_value + new_value, i128::from(total_qty.hundredths()));
            i64::try_from(avg)
                .map(MoneyCents::new)
                .map_err(|_| EngineError::InvalidAmount("price too large".to_string()))?
        };
        self.quantity = total_qty;
        Ok(())
    }

    /// Remove `quantity` from stock, refusing to go below zero.
    pub fn issue(&mut self, quantity: Quantity) -> ResultEngine<()> {
        if quantity > self.quantity {
            return Err(EngineError::InsufficientStock(format!(
                "{} has {} in stock, requested {}",
                self.name, self.quantity, quantity
            )));
        }
        self.quantity = self
            .quantity
            .checked_sub(quantity)
            .ok_or_else(|| EngineError::InvalidAmount("quantity too large".to_string()))?;
        Ok(())
    }

    /// Put `quantity` back into stock (reversal of an outbound).
    pub fn restock(&mut self, quantity: Quantity) -> ResultEngine<()> {
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| EngineError::InvalidAmount("quantity too large".to_string()))?;
        Ok(())
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity.is_positive() && self.quantity < LOW_STOCK_THRESHOLD
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "nursery_plants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
    pub spec: String,
    pub unit: String,
    pub quantity: i64,
    pub price: i64,
    pub location: Option<String>,
    pub remark: Option<String>,
    pub create_at: DateTimeUtc,
    pub update_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Plant> for ActiveModel {
    fn from(value: &Plant) -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            category: ActiveValue::Set(value.category.clone()),
            spec: ActiveValue::Set(value.spec.clone()),
            unit: ActiveValue::Set(value.unit.clone()),
            quantity: ActiveValue::Set(value.quantity.hundredths()),
            price: ActiveValue::Set(value.price.cents()),
            location: ActiveValue::Set(value.location.clone()),
            remark: ActiveValue::Set(value.remark.clone()),
            create_at: ActiveValue::Set(value.create_at),
            update_at: ActiveValue::Set(value.update_at),
        }
    }
}

impl From<Model> for Plant {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            spec: model.spec,
            unit: model.unit,
            quantity: Quantity::new(model.quantity),
            price: MoneyCents::new(model.price),
            location: model.location,
            remark: model.remark,
            create_at: model.create_at,
            update_at: model.update_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn plant() -> Plant {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        Plant {
            id: 1,
            name: "Ginkgo".to_string(),
            category: None,
            spec: "D8".to_string(),
            unit: "tree".to_string(),
            quantity: Quantity::ZERO,
            price: MoneyCents::ZERO,
            location: None,
            remark: None,
            create_at: at,
            update_at: at,
        }
    }

    #[test]
    fn receive_into_empty_takes_new_price() {
        let mut plant = plant();
        plant.receive(Quantity::units(10), MoneyCents::new(2_000)).unwrap();
        assert_eq!(plant.quantity, Quantity::units(10));
        assert_eq!(plant.price, MoneyCents::new(2_000));
    }

    #[test]
    fn receive_computes_weighted_average() {
        let mut plant = plant();
        plant.receive(Quantity::units(10), MoneyCents::new(1_000)).unwrap();
        plant.receive(Quantity::units(30), MoneyCents::new(2_000)).unwrap();
        // (10*10 + 30*20) / 40 = 17.50
        assert_eq!(plant.quantity, Quantity::units(40));
        assert_eq!(plant.price, MoneyCents::new(1_750));
    }

    #[test]
    fn receive_rounds_half_up() {
        let mut plant = plant();
        plant.receive(Quantity::units(2), MoneyCents::new(1)).unwrap();
        plant.receive(Quantity::units(2), MoneyCents::new(2)).unwrap();
        // (2*0.01 + 2*0.02) / 4 = 0.015 -> 0.02
        assert_eq!(plant.price, MoneyCents::new(2));
    }

    #[test]
    fn issue_refuses_to_go_negative() {
        let mut plant = plant();
        plant.receive(Quantity::units(5), MoneyCents::new(100)).unwrap();
        let err = plant.issue(Quantity::units(6)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientStock(_)));
        assert_eq!(plant.quantity, Quantity::units(5));

        plant.issue(Quantity::units(5)).unwrap();
        assert_eq!(plant.quantity, Quantity::ZERO);
    }

    #[test]
    fn low_stock_excludes_empty_lines() {
        let mut plant = plant();
        assert!(!plant.is_low_stock());
        plant.receive(Quantity::units(49), MoneyCents::new(100)).unwrap();
        assert!(plant.is_low_stock());
        plant.receive(Quantity::units(1), MoneyCents::new(100)).unwrap();
        assert!(!plant.is_low_stock());
    }
}
