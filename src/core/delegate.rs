//! Generic model delegate - CRUD, aggregate and group-by operations for any model.
//!
//! Each model module describes itself through [`ModelSpec`]: how its where and
//! unique inputs become conditions, and how create and update inputs become
//! active models. [`Delegate`] then provides the same operation set for every
//! model on top of `SeaORM`, running against either a pooled connection or an
//! open transaction.

use crate::{
    errors::{Error, Result},
    query::{
        AggregateResult, FindManyArgs, GroupByRow, OrderBy, QueryLimits, SortOrder,
        aggregate::{COUNT_ALIAS, GroupCountRow, KEY_ALIAS, count_expr, is_numeric, numeric_exprs},
    },
};
use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseTransaction, DbErr, EntityTrait, FromQueryResult, IdenStatic, IntoActiveModel, Linked,
    LoaderTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Related,
    Select, TransactionTrait, TryGetable,
    prelude::DateTimeUtc,
    sea_query::OnConflict,
};
use std::marker::PhantomData;
use tracing::{debug, info, instrument};

/// Column type of a spec's entity
pub type ColumnOf<S> = <<S as ModelSpec>::Entity as EntityTrait>::Column;

/// Find-many arguments of a spec's entity
pub type ArgsOf<S> = FindManyArgs<<S as ModelSpec>::Where, <S as ModelSpec>::Unique, ColumnOf<S>>;

/// Describes one model to the generic [`Delegate`].
pub trait ModelSpec {
    type Entity: EntityTrait<Model = Self::Model>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Clone
        + Send
        + Sync
        + 'static;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + 'static;
    /// Filter over many rows
    type Where: Default + Send;
    /// Selects at most one row through a unique column
    type Unique: Send;
    type Create: Send;
    type Update: Send;

    /// Name used in errors and logs
    const MODEL_NAME: &'static str;

    /// Primary key column, used as the final ordering tiebreaker
    fn id_column() -> ColumnOf<Self>;

    fn where_condition(input: Self::Where) -> Condition;

    fn unique_condition(input: Self::Unique) -> Condition;

    /// Validates `input` and builds a fully populated active model.
    fn from_create(input: Self::Create, now: DateTimeUtc) -> Result<Self::ActiveModel>;

    /// Sets every field present in `input` on `model`.
    fn apply_update(model: &mut Self::ActiveModel, input: Self::Update, now: DateTimeUtc) -> Result<()>;
}

/// Typed data access for one model over one connection.
#[derive(Debug)]
pub struct Delegate<'a, C, S> {
    pub(crate) db: &'a C,
    pub(crate) limits: QueryLimits,
    spec: PhantomData<fn() -> S>,
}

impl<C, S> Clone for Delegate<'_, C, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, S> Copy for Delegate<'_, C, S> {}

impl<'a, C, S> Delegate<'a, C, S>
where
    C: ConnectionTrait,
    S: ModelSpec,
{
    /// Creates a delegate running its queries on `db`.
    pub const fn new(db: &'a C, limits: QueryLimits) -> Self {
        Self {
            db,
            limits,
            spec: PhantomData,
        }
    }

    pub(crate) fn db_err(err: DbErr) -> Error {
        Error::from_db(S::MODEL_NAME, err)
    }

    fn numeric_field(field: ColumnOf<S>) -> Result<ColumnOf<S>> {
        if is_numeric(field) {
            Ok(field)
        } else {
            Err(Error::validation(format!(
                "{}.{} is not numeric and cannot be aggregated",
                S::MODEL_NAME,
                field.as_str()
            )))
        }
    }

    const fn not_found() -> Error {
        Error::NotFound {
            model: S::MODEL_NAME,
        }
    }

    /// Finds the record selected by `unique`.
    pub async fn find_unique(&self, unique: S::Unique) -> Result<Option<S::Model>> {
        S::Entity::find()
            .filter(S::unique_condition(unique))
            .one(self.db)
            .await
            .map_err(Self::db_err)
    }

    /// Like [`Self::find_unique`] but a missing record is an error.
    pub async fn find_unique_or_throw(&self, unique: S::Unique) -> Result<S::Model> {
        self.find_unique(unique).await?.ok_or_else(Self::not_found)
    }

    /// Returns the first record matching `args`, honouring order, cursor and skip.
    pub async fn find_first(&self, args: ArgsOf<S>) -> Result<Option<S::Model>> {
        let mut rows = self.find_many(args.take(1)).await?;
        Ok(rows.pop())
    }

    /// Like [`Self::find_first`] but no match is an error.
    pub async fn find_first_or_throw(&self, args: ArgsOf<S>) -> Result<S::Model> {
        self.find_first(args).await?.ok_or_else(Self::not_found)
    }

    /// Returns one page of records matching `args`.
    ///
    /// An unknown cursor yields an empty page.
    pub async fn find_many(&self, args: ArgsOf<S>) -> Result<Vec<S::Model>> {
        let Some(select) = self.build_select(args).await? else {
            debug!("{} cursor not found, returning empty page", S::MODEL_NAME);
            return Ok(Vec::new());
        };
        let rows = select.all(self.db).await.map_err(Self::db_err)?;
        debug!("Fetched {} {} records", rows.len(), S::MODEL_NAME);
        Ok(rows)
    }

    async fn build_select(&self, args: ArgsOf<S>) -> Result<Option<Select<S::Entity>>> {
        let FindManyArgs {
            where_input,
            mut order_by,
            cursor,
            skip,
            take,
        } = args;

        let id = S::id_column();
        if !order_by.iter().any(|o| o.column.as_str() == id.as_str()) {
            order_by.push(OrderBy::asc(id));
        }

        let mut cond = S::where_condition(where_input);
        if let Some(cursor) = cursor {
            let Some(anchor) = self.find_unique(cursor).await? else {
                return Ok(None);
            };
            cond = cond.add(keyset_condition(&anchor, &order_by));
        }

        let mut select = S::Entity::find().filter(cond);
        for term in &order_by {
            select = select.order_by(term.column, term.order.into());
        }
        Ok(Some(
            select
                .offset(skip)
                .limit(self.limits.resolve(take)),
        ))
    }

    /// Number of records matching `where_input`.
    pub async fn count(&self, where_input: S::Where) -> Result<u64> {
        S::Entity::find()
            .filter(S::where_condition(where_input))
            .count(self.db)
            .await
            .map_err(Self::db_err)
    }

    /// Inserts one record.
    #[instrument(skip_all, fields(model = S::MODEL_NAME))]
    pub async fn create(&self, input: S::Create) -> Result<S::Model> {
        let active = S::from_create(input, Utc::now())?;
        let created = active.insert(self.db).await.map_err(Self::db_err)?;
        info!(
            "Created {} {:?}",
            S::MODEL_NAME,
            created.get(S::id_column())
        );
        Ok(created)
    }

    /// Inserts many records in one statement and returns how many were written.
    ///
    /// With `skip_duplicates`, rows that violate a unique constraint are
    /// silently left out instead of failing the whole batch.
    #[instrument(skip_all, fields(model = S::MODEL_NAME))]
    pub async fn create_many(&self, inputs: Vec<S::Create>, skip_duplicates: bool) -> Result<u64> {
        if inputs.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let models = inputs
            .into_iter()
            .map(|input| S::from_create(input, now))
            .collect::<Result<Vec<_>>>()?;

        let mut insert = S::Entity::insert_many(models);
        if skip_duplicates {
            insert = insert.on_conflict(OnConflict::new().do_nothing().to_owned());
        }
        let inserted = insert
            .exec_without_returning(self.db)
            .await
            .map_err(Self::db_err)?;
        info!("Created {} {} records", inserted, S::MODEL_NAME);
        Ok(inserted)
    }

    /// Updates the record selected by `unique`.
    pub async fn update(&self, unique: S::Unique, input: S::Update) -> Result<S::Model> {
        let existing = self.find_unique_or_throw(unique).await?;
        self.update_existing(existing, input).await
    }

    #[instrument(skip_all, fields(model = S::MODEL_NAME))]
    async fn update_existing(&self, existing: S::Model, input: S::Update) -> Result<S::Model> {
        let mut active: S::ActiveModel = existing.clone().into_active_model();
        S::apply_update(&mut active, input, Utc::now())?;
        if !active.is_changed() {
            return Ok(existing);
        }
        let updated = active.update(self.db).await.map_err(Self::db_err)?;
        info!(
            "Updated {} {:?}",
            S::MODEL_NAME,
            updated.get(S::id_column())
        );
        Ok(updated)
    }

    /// Applies `input` to every record matching `where_input`.
    ///
    /// Returns the number of records matched.
    #[instrument(skip_all, fields(model = S::MODEL_NAME))]
    pub async fn update_many(&self, where_input: S::Where, input: S::Update) -> Result<u64> {
        let mut active = <S::ActiveModel as ActiveModelBehavior>::new();
        S::apply_update(&mut active, input, Utc::now())?;
        if !active.is_changed() {
            return self.count(where_input).await;
        }
        let result = S::Entity::update_many()
            .set(active)
            .filter(S::where_condition(where_input))
            .exec(self.db)
            .await
            .map_err(Self::db_err)?;
        info!("Updated {} {} records", result.rows_affected, S::MODEL_NAME);
        Ok(result.rows_affected)
    }

    /// Deletes the record selected by `unique` and returns it.
    #[instrument(skip_all, fields(model = S::MODEL_NAME))]
    pub async fn delete(&self, unique: S::Unique) -> Result<S::Model> {
        let existing = self.find_unique_or_throw(unique).await?;
        let id = S::id_column();
        S::Entity::delete_many()
            .filter(id.eq(existing.get(id)))
            .exec(self.db)
            .await
            .map_err(Self::db_err)?;
        info!("Deleted {} {:?}", S::MODEL_NAME, existing.get(id));
        Ok(existing)
    }

    /// Deletes every record matching `where_input` and returns how many went.
    #[instrument(skip_all, fields(model = S::MODEL_NAME))]
    pub async fn delete_many(&self, where_input: S::Where) -> Result<u64> {
        let result = S::Entity::delete_many()
            .filter(S::where_condition(where_input))
            .exec(self.db)
            .await
            .map_err(Self::db_err)?;
        info!("Deleted {} {} records", result.rows_affected, S::MODEL_NAME);
        Ok(result.rows_affected)
    }

    /// Count, sum, average, minimum and maximum of `field` over the matching records.
    ///
    /// `field` must be a numeric column.
    pub async fn aggregate(&self, where_input: S::Where, field: ColumnOf<S>) -> Result<AggregateResult> {
        let field = Self::numeric_field(field)?;
        let mut select = S::Entity::find()
            .select_only()
            .column_as(count_expr(), COUNT_ALIAS);
        for (expr, alias) in numeric_exprs(field) {
            select = select.column_as(expr, alias);
        }
        let result = select
            .filter(S::where_condition(where_input))
            .into_model::<AggregateResult>()
            .one(self.db)
            .await
            .map_err(Self::db_err)?
            .unwrap_or_default();
        debug!("Aggregated {} {}: {:?}", S::MODEL_NAME, field.as_str(), result);
        Ok(result)
    }

    /// Groups the matching records by `by`, ordered by the group key.
    ///
    /// Every group carries its row count; the numeric aggregates are filled in
    /// when `field` is given, which must then be a numeric column.
    pub async fn group_by<K>(
        &self,
        by: ColumnOf<S>,
        where_input: S::Where,
        field: Option<ColumnOf<S>>,
    ) -> Result<Vec<GroupByRow<K>>>
    where
        K: TryGetable + Send + Sync + 'static,
    {
        let field = field.map(Self::numeric_field).transpose()?;
        let select = S::Entity::find()
            .select_only()
            .column_as(by, KEY_ALIAS)
            .column_as(count_expr(), COUNT_ALIAS)
            .filter(S::where_condition(where_input))
            .group_by(by)
            .order_by_asc(by);
        let rows = match field {
            Some(field) => {
                let select = numeric_exprs(field)
                    .into_iter()
                    .fold(select, |select, (expr, alias)| select.column_as(expr, alias));
                select
                    .into_model::<GroupByRow<K>>()
                    .all(self.db)
                    .await
                    .map_err(Self::db_err)?
            }
            None => select
                .into_model::<GroupCountRow<K>>()
                .all(self.db)
                .await
                .map_err(Self::db_err)?
                .into_iter()
                .map(GroupCountRow::into_group)
                .collect(),
        };
        debug!("Grouped {} by {} into {} groups", S::MODEL_NAME, by.as_str(), rows.len());
        Ok(rows)
    }

    /// Runs `find_many` and loads the has-many relation `related` of every record.
    pub async fn find_many_include_many<R>(
        &self,
        args: ArgsOf<S>,
        related: R,
    ) -> Result<Vec<(S::Model, Vec<R::Model>)>>
    where
        R: EntityTrait,
        R::Model: Send + Sync,
        S::Entity: Related<R>,
    {
        let parents = self.find_many(args).await?;
        let children = parents
            .load_many(related, self.db)
            .await
            .map_err(Self::db_err)?;
        Ok(parents.into_iter().zip(children).collect())
    }

    /// Runs `find_many` and loads the belongs-to relation `related` of every record.
    pub async fn find_many_include_one<R>(
        &self,
        args: ArgsOf<S>,
        related: R,
    ) -> Result<Vec<(S::Model, Option<R::Model>)>>
    where
        R: EntityTrait,
        R::Model: Send + Sync,
        S::Entity: Related<R>,
    {
        let children = self.find_many(args).await?;
        let parents = children
            .load_one(related, self.db)
            .await
            .map_err(Self::db_err)?;
        Ok(children.into_iter().zip(parents).collect())
    }

    /// Runs `find_many` and joins in the single record reached through `link`.
    ///
    /// For links whose last hop is a belongs-to, such as a donation's verifier.
    pub async fn find_many_include_linked<L>(
        &self,
        args: ArgsOf<S>,
        link: L,
    ) -> Result<Vec<(S::Model, Option<<L::ToEntity as EntityTrait>::Model>)>>
    where
        L: Linked<FromEntity = S::Entity>,
    {
        let Some(select) = self.build_select(args).await? else {
            return Ok(Vec::new());
        };
        select
            .find_also_linked(link)
            .all(self.db)
            .await
            .map_err(Self::db_err)
    }

    /// Runs `find_many` and loads every record reached through `link` for each result.
    pub async fn find_many_include_linked_many<L>(
        &self,
        args: ArgsOf<S>,
        link: L,
    ) -> Result<Vec<(S::Model, Vec<<L::ToEntity as EntityTrait>::Model>)>>
    where
        L: Linked<FromEntity = S::Entity> + Copy,
    {
        let parents = self.find_many(args).await?;
        let mut out = Vec::with_capacity(parents.len());
        for parent in parents {
            let linked = parent
                .find_linked(link)
                .all(self.db)
                .await
                .map_err(Self::db_err)?;
            out.push((parent, linked));
        }
        Ok(out)
    }
}

impl<C, S> Delegate<'_, C, S>
where
    C: ConnectionTrait + TransactionTrait,
    S: ModelSpec,
{
    /// Updates the record selected by `unique`, or creates it when missing.
    ///
    /// Lookup and write happen in one transaction.
    pub async fn upsert(&self, unique: S::Unique, create: S::Create, update: S::Update) -> Result<S::Model> {
        let txn = self.db.begin().await?;
        let scoped = Delegate::<DatabaseTransaction, S>::new(&txn, self.limits);
        let model = match scoped.find_unique(unique).await? {
            Some(existing) => scoped.update_existing(existing, update).await?,
            None => scoped.create(create).await?,
        };
        txn.commit().await?;
        Ok(model)
    }
}

/// Rows at or after `anchor` in the order given by `order_by`.
///
/// `order_by` must end with a unique column so the anchor row is the only one
/// equal on every term.
fn keyset_condition<M: ModelTrait>(anchor: &M, order_by: &[OrderBy<<M::Entity as EntityTrait>::Column>]) -> Condition {
    let mut after = Condition::any();
    for (i, term) in order_by.iter().enumerate() {
        let mut step = Condition::all();
        for prev in &order_by[..i] {
            step = step.add(prev.column.eq(anchor.get(prev.column)));
        }
        let value = anchor.get(term.column);
        let strict = match term.order {
            SortOrder::Asc => term.column.gt(value),
            SortOrder::Desc => term.column.lt(value),
        };
        after = after.add(step.add(strict));
    }
    let same = order_by.iter().fold(Condition::all(), |cond, term| {
        cond.add(term.column.eq(anchor.get(term.column)))
    });
    after.add(same)
}
