//! Serde helpers shared by the wire types.

/// Serialize integers as decimal strings; accept strings or JSON numbers on input.
///
/// Keeps full precision when the JSON is consumed by environments whose native
/// number type is an IEEE 754 double.
pub mod decimal_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        Text(String),
    }

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + TryFrom<u64>,
        <T as FromStr>::Err: Display,
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => {
                T::try_from(n).map_err(|_| de::Error::custom(format!("{} is out of range", n)))
            }
            Repr::Text(s) => s.trim().parse::<T>().map_err(de::Error::custom),
        }
    }
}
