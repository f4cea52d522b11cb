use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, Page, PageRequest, Payer, PayerNew, PayerType, PayerUpdate, ResultEngine,
    payers, pays,
    util::{normalize_optional_text, normalize_required},
};

use super::{Engine, apply_optional, apply_required, like_filter, with_tx};

/// Filters for listing payers. Text filters match substrings.
#[derive(Clone, Debug, Default)]
pub struct PayerFilter {
    pub type_id: Option<i32>,
    pub name: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub remark: Option<String>,
}

impl PayerFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(type_id) = self.type_id {
            cond = cond.add(payers::Column::TypeId.eq(type_id));
        }
        cond = like_filter(cond, payers::Column::Name, self.name.as_deref());
        cond = like_filter(cond, payers::Column::BankName, self.bank_name.as_deref());
        cond = like_filter(
            cond,
            payers::Column::AccountNumber,
            self.account_number.as_deref(),
        );
        like_filter(cond, payers::Column::Remark, self.remark.as_deref())
    }
}

impl Engine {
    /// Return a payer.
    pub async fn payer(&self, id: i32) -> ResultEngine<Payer> {
        let model = payers::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("payer {id}")))?;
        Payer::try_from(model)
    }

    /// Add a new payer.
    pub async fn new_payer(&self, cmd: PayerNew) -> ResultEngine<Payer> {
        let payer = Payer {
            id: 0,
            payer_type: PayerType::try_from(cmd.type_id)?,
            name: normalize_required(&cmd.name, "name")?,
            bank_name: normalize_optional_text(cmd.bank_name.as_deref()),
            account_number: normalize_optional_text(cmd.account_number.as_deref()),
            remark: normalize_optional_text(cmd.remark.as_deref()),
            create_at: Utc::now(),
        };
        with_tx!(self, |db_tx| {
            let model = payers::ActiveModel::from(&payer).insert(&db_tx).await?;
            Payer::try_from(model)
        })
    }

    /// Partially update a payer.
    pub async fn update_payer(&self, id: i32, cmd: PayerUpdate) -> ResultEngine<Payer> {
        with_tx!(self, |db_tx| {
            let model = payers::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("payer {id}")))?;
            let mut payer = Payer::try_from(model)?;

            if let Some(type_id) = cmd.type_id {
                payer.payer_type = PayerType::try_from(type_id)?;
            }
            apply_required(&mut payer.name, cmd.name.as_deref(), "name")?;
            apply_optional(&mut payer.bank_name, cmd.bank_name.as_deref());
            apply_optional(&mut payer.account_number, cmd.account_number.as_deref());
            apply_optional(&mut payer.remark, cmd.remark.as_deref());

            let mut active = payers::ActiveModel::from(&payer);
            active.id = ActiveValue::Unchanged(id);
            let model = active.update(&db_tx).await?;
            Payer::try_from(model)
        })
    }

    /// Delete a payer, detaching its payments first.
    pub async fn delete_payer(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            payers::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("payer {id}")))?;

            pays::Entity::update_many()
                .col_expr(
                    pays::Column::PayerSupplierId,
                    Expr::value(Option::<i32>::None),
                )
                .filter(pays::Column::PayerSupplierId.eq(id))
                .exec(&db_tx)
                .await?;

            payers::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// List payers, newest first.
    pub async fn list_payers(
        &self,
        filter: &PayerFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<Payer>> {
        with_tx!(self, |db_tx| {
            let query = payers::Entity::find().filter(filter.condition());
            let total = query.clone().count(&db_tx).await?;
            let items = query
                .order_by_desc(payers::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Payer::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(Page { items, total })
        })
    }
}
