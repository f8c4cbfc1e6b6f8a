//! A scalar that may be explicitly absent, on the JSON wire and in a
//! NULL-able column alike.
//!
//! JSON: absent encodes as `null`; `null` or a missing field (with
//! `#[serde(default)]`) decodes as absent. A value of the wrong type is a
//! decode error rather than a silent absent.
//!
//! Storage: SQL NULL decodes as absent and absent binds as SQL NULL.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{
    database::{HasArguments, HasValueRef},
    encode::IsNull,
    error::BoxDynError,
    Database, Decode, Encode, Type,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nullable<T>(Option<T>);

impl<T> Nullable<T> {
    pub fn present(value: T) -> Self {
        Self(Some(value))
    }

    pub fn absent() -> Self {
        Self(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self)
    }
}

impl<DB: Database, T: Type<DB>> Type<DB> for Nullable<T> {
    fn type_info() -> DB::TypeInfo {
        T::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        T::compatible(ty)
    }
}

impl<'r, DB: Database, T: Decode<'r, DB>> Decode<'r, DB> for Nullable<T> {
    fn decode(value: <DB as HasValueRef<'r>>::ValueRef) -> Result<Self, BoxDynError> {
        <Option<T> as Decode<'r, DB>>::decode(value).map(Self)
    }
}

impl<'q, DB: Database, T: Encode<'q, DB> + Type<DB> + 'q> Encode<'q, DB> for Nullable<T> {
    fn encode_by_ref(&self, buf: &mut <DB as HasArguments<'q>>::ArgumentBuffer) -> IsNull {
        match &self.0 {
            Some(value) => <T as Encode<'q, DB>>::encode_by_ref(value, buf),
            None => IsNull::Yes,
        }
    }

    fn produces(&self) -> Option<DB::TypeInfo> {
        match &self.0 {
            Some(value) => <T as Encode<'q, DB>>::produces(value),
            None => Some(T::type_info()),
        }
    }

    fn size_hint(&self) -> usize {
        self.0.as_ref().map_or(0, <T as Encode<'q, DB>>::size_hint)
    }
}
