use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    Dictionary, DictionaryDetail, DictionaryDetailNew, DictionaryDetailUpdate, DictionaryNew,
    DictionaryUpdate, EngineError, Page, PageRequest, ResultEngine,
    dictionaries::{self, VALID_MARK},
    dictionary_details,
    util::normalize_required,
};

use super::{Engine, apply_required, with_tx};

fn normalize_valid_mark(value: &str) -> ResultEngine<String> {
    match value.trim() {
        "Y" | "y" => Ok("Y".to_string()),
        "N" | "n" => Ok("N".to_string()),
        other => Err(EngineError::InvalidInput(format!(
            "invalid valid_mark: {other} (expected Y or N)"
        ))),
    }
}

impl Engine {
    async fn require_dictionary(
        &self,
        db_tx: &DatabaseTransaction,
        id: i32,
    ) -> ResultEngine<dictionaries::Model> {
        dictionaries::Entity::find_by_id(id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("dictionary {id}")))
    }

    async fn ensure_dictionary_code_free(
        &self,
        db_tx: &DatabaseTransaction,
        code: &str,
        except_id: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = dictionaries::Entity::find().filter(dictionaries::Column::Code.eq(code));
        if let Some(id) = except_id {
            query = query.filter(dictionaries::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(code.to_string()));
        }
        Ok(())
    }

    /// List dictionaries whose code or name contains `keyword`.
    pub async fn list_dictionaries(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> ResultEngine<Page<Dictionary>> {
        let mut cond = Condition::all();
        if let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
            cond = cond.add(
                Condition::any()
                    .add(dictionaries::Column::Code.contains(keyword))
                    .add(dictionaries::Column::Name.contains(keyword)),
            );
        }
        with_tx!(self, |db_tx| {
            let query = dictionaries::Entity::find().filter(cond);
            let total = query.clone().count(&db_tx).await?;
            let items = query
                .order_by_asc(dictionaries::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Dictionary::from)
                .collect();
            Ok(Page { items, total })
        })
    }

    /// Add a dictionary. `code` must be unique.
    pub async fn new_dictionary(&self, cmd: DictionaryNew, user: &str) -> ResultEngine<Dictionary> {
        let dictionary = Dictionary {
            id: 0,
            code: normalize_required(&cmd.code, "code")?,
            name: normalize_required(&cmd.name, "name")?,
            valid_mark: VALID_MARK.to_string(),
            create_user: Some(user.to_string()),
            create_time: Some(Utc::now()),
            update_user: None,
            update_time: None,
        };
        with_tx!(self, |db_tx| {
            self.ensure_dictionary_code_free(&db_tx, &dictionary.code, None)
                .await?;
            let model = dictionaries::ActiveModel::from(&dictionary)
                .insert(&db_tx)
                .await?;
            Ok(Dictionary::from(model))
        })
    }

    pub async fn update_dictionary(
        &self,
        id: i32,
        cmd: DictionaryUpdate,
        user: &str,
    ) -> ResultEngine<Dictionary> {
        with_tx!(self, |db_tx| {
            let mut dictionary = Dictionary::from(self.require_dictionary(&db_tx, id).await?);
            apply_required(&mut dictionary.code, cmd.code.as_deref(), "code")?;
            apply_required(&mut dictionary.name, cmd.name.as_deref(), "name")?;
            if let Some(mark) = cmd.valid_mark.as_deref() {
                dictionary.valid_mark = normalize_valid_mark(mark)?;
            }
            dictionary.update_user = Some(user.to_string());
            dictionary.update_time = Some(Utc::now());

            self.ensure_dictionary_code_free(&db_tx, &dictionary.code, Some(id))
                .await?;

            let mut active = dictionaries::ActiveModel::from(&dictionary);
            active.id = ActiveValue::Unchanged(id);
            let model = active.update(&db_tx).await?;
            Ok(Dictionary::from(model))
        })
    }

    /// Delete a dictionary. Refused while it still has details.
    pub async fn delete_dictionary(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_dictionary(&db_tx, id).await?;
            let details = dictionary_details::Entity::find()
                .filter(dictionary_details::Column::DicId.eq(id))
                .count(&db_tx)
                .await?;
            if details > 0 {
                return Err(EngineError::InUse(format!(
                    "dictionary {} still has {details} details",
                    model.code
                )));
            }
            dictionaries::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Details of a dictionary, paginated, in display order.
    ///
    /// Without `dic_id` every detail is listed.
    pub async fn list_dictionary_details(
        &self,
        dic_id: Option<i32>,
        page: PageRequest,
    ) -> ResultEngine<Page<DictionaryDetail>> {
        with_tx!(self, |db_tx| {
            let mut query = dictionary_details::Entity::find();
            if let Some(dic_id) = dic_id {
                query = query.filter(dictionary_details::Column::DicId.eq(dic_id));
            }
            let total = query.clone().count(&db_tx).await?;
            let items = query
                .order_by_asc(dictionary_details::Column::DicId)
                .order_by_asc(dictionary_details::Column::OrderNo)
                .order_by_asc(dictionary_details::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(DictionaryDetail::from)
                .collect();
            Ok(Page { items, total })
        })
    }

    /// Valid details of the dictionary identified by `code`, in display order.
    pub async fn dictionary_details_by_code(
        &self,
        code: &str,
    ) -> ResultEngine<Vec<DictionaryDetail>> {
        let code = code.trim();
        with_tx!(self, |db_tx| {
            let dictionary = dictionaries::Entity::find()
                .filter(dictionaries::Column::Code.eq(code))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("dictionary {code}")))?;
            let items = dictionary_details::Entity::find()
                .filter(dictionary_details::Column::DicId.eq(dictionary.id))
                .filter(dictionary_details::Column::ValidMark.eq(VALID_MARK))
                .order_by_asc(dictionary_details::Column::OrderNo)
                .order_by_asc(dictionary_details::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(DictionaryDetail::from)
                .collect();
            Ok(items)
        })
    }

    /// Add a detail to a dictionary.
    pub async fn new_dictionary_detail(
        &self,
        cmd: DictionaryDetailNew,
        user: &str,
    ) -> ResultEngine<DictionaryDetail> {
        let code = normalize_required(&cmd.code, "code")?;
        let value = normalize_required(&cmd.value, "value")?;
        with_tx!(self, |db_tx| {
            self.require_dictionary(&db_tx, cmd.dic_id).await?;

            let order_no = match cmd.order_no {
                Some(order_no) => order_no,
                None => dictionary_details::Entity::find()
                    .filter(dictionary_details::Column::DicId.eq(cmd.dic_id))
                    .order_by_desc(dictionary_details::Column::OrderNo)
                    .one(&db_tx)
                    .await?
                    .map_or(1, |last| last.order_no + 1),
            };

            let detail = DictionaryDetail {
                id: 0,
                dic_id: cmd.dic_id,
                code,
                value,
                order_no,
                valid_mark: VALID_MARK.to_string(),
                create_user: Some(user.to_string()),
                create_time: Some(Utc::now()),
                update_user: None,
                update_time: None,
            };
            let model = dictionary_details::ActiveModel::from(&detail)
                .insert(&db_tx)
                .await?;
            Ok(DictionaryDetail::from(model))
        })
    }

    pub async fn update_dictionary_detail(
        &self,
        id: i32,
        cmd: DictionaryDetailUpdate,
        user: &str,
    ) -> ResultEngine<DictionaryDetail> {
        with_tx!(self, |db_tx| {
            let model = dictionary_details::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("dictionary detail {id}")))?;
            let mut detail = DictionaryDetail::from(model);

            apply_required(&mut detail.code, cmd.code.as_deref(), "code")?;
            apply_required(&mut detail.value, cmd.value.as_deref(), "value")?;
            if let Some(order_no) = cmd.order_no {
                detail.order_no = order_no;
            }
            if let Some(mark) = cmd.valid_mark.as_deref() {
                detail.valid_mark = normalize_valid_mark(mark)?;
            }
            detail.update_user = Some(user.to_string());
            detail.update_time = Some(Utc::now());

            let mut active = dictionary_details::ActiveModel::from(&detail);
            active.id = ActiveValue::Unchanged(id);
            let model = active.update(&db_tx).await?;
            Ok(DictionaryDetail::from(model))
        })
    }

    pub async fn delete_dictionary_detail(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = dictionary_details::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(format!("dictionary detail {id}")));
            }
            Ok(())
        })
    }
}
