use serde::{Deserialize, Serialize};

/// Lowercases and folds `-`/`_` to spaces so `"poly-mailer"` matches `"Poly mailer"`.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', '_'], " ")
}

/// How quickly inbound freight is received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceivingType {
    #[default]
    Standard,
    Expedited,
    Weekend,
}

impl ReceivingType {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Expedited, Self::Weekend];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Expedited => "Expedited",
            Self::Weekend => "Weekend",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match normalize(s).as_str() {
            "standard" => Some(Self::Standard),
            "expedited" => Some(Self::Expedited),
            "weekend" => Some(Self::Weekend),
            _ => None,
        }
    }
}

/// Warehouse environment a pallet is stored in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    #[default]
    Standard,
    ClimateControlled,
    Hazmat,
}

impl StorageType {
    pub const ALL: [Self; 3] = [Self::Standard, Self::ClimateControlled, Self::Hazmat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::ClimateControlled => "Climate-controlled",
            Self::Hazmat => "Hazmat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match normalize(s).as_str() {
            "standard" => Some(Self::Standard),
            "climate controlled" => Some(Self::ClimateControlled),
            "hazmat" => Some(Self::Hazmat),
            _ => None,
        }
    }
}

/// Outer packaging used when packing an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackagingType {
    #[default]
    PolyMailer,
    SmallBox,
    MediumBox,
    LargeBox,
}

impl PackagingType {
    pub const ALL: [Self; 4] = [
        Self::PolyMailer,
        Self::SmallBox,
        Self::MediumBox,
        Self::LargeBox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PolyMailer => "Poly mailer",
            Self::SmallBox => "Small box",
            Self::MediumBox => "Medium box",
            Self::LargeBox => "Large box",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match normalize(s).as_str() {
            "poly mailer" => Some(Self::PolyMailer),
            "small box" => Some(Self::SmallBox),
            "medium box" => Some(Self::MediumBox),
            "large box" => Some(Self::LargeBox),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn every_type_parses_its_own_name() {
        for t in ReceivingType::ALL {
            assert_eq!(ReceivingType::parse(t.as_str()), Some(t));
        }
        for t in StorageType::ALL {
            assert_eq!(StorageType::parse(t.as_str()), Some(t));
        }
        for t in PackagingType::ALL {
            assert_eq!(PackagingType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn parse_accepts_cli_spelling() {
        assert_eq!(
            StorageType::parse("climate-controlled"),
            Some(StorageType::ClimateControlled)
        );
        assert_eq!(
            PackagingType::parse("LARGE_BOX"),
            Some(PackagingType::LargeBox)
        );
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(ReceivingType::parse("overnight"), None);
    }

    #[test]
    fn defaults_match_initial_form_values() {
        assert_eq!(ReceivingType::default(), ReceivingType::Standard);
        assert_eq!(StorageType::default(), StorageType::Standard);
        assert_eq!(PackagingType::default(), PackagingType::PolyMailer);
    }
}
