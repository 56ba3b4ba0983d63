use crate::domain::entities::translatable_value::TranslatableValue;
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;

/// Column type of a translatable field's primary value.
///
/// Writes accept only a collapsed primary value; a proxy reaching storage
/// is an internal consistency error. Reads wrap the stored string, `NULL`
/// included, so the lifecycle listener can upgrade it later.
#[derive(Clone, Debug, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub struct TranslatableColumn(pub TranslatableValue);

impl TranslatableColumn {
    pub fn into_inner(self) -> TranslatableValue {
        self.0
    }
}

impl From<TranslatableValue> for TranslatableColumn {
    fn from(value: TranslatableValue) -> Self {
        Self(value)
    }
}

impl ToSql<Text, Sqlite> for TranslatableColumn {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        match self.0.to_column()? {
            Some(value) => <str as ToSql<Text, Sqlite>>::to_sql(value, out),
            None => Ok(IsNull::Yes),
        }
    }
}

impl FromSql<Text, Sqlite> for TranslatableColumn {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let value = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(Self(TranslatableValue::from_column(Some(value))))
    }

    fn from_nullable_sql(
        bytes: Option<<Sqlite as Backend>::RawValue<'_>>,
    ) -> deserialize::Result<Self> {
        match bytes {
            Some(bytes) => Self::from_sql(bytes),
            None => Ok(Self(TranslatableValue::from_column(None))),
        }
    }
}
