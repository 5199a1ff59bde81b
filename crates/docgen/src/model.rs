//! Agreement data model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Legal form of a company client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyForm {
    /// Общество с ограниченной ответственностью
    Ooo,
    /// Акционерное общество
    Ao,
    /// Публичное акционерное общество
    Pao,
    /// Некоммерческая организация
    Nko,
}

impl CompanyForm {
    pub fn full_name(&self) -> &'static str {
        match self {
            CompanyForm::Ooo => "Общество с ограниченной ответственностью",
            CompanyForm::Ao => "Акционерное общество",
            CompanyForm::Pao => "Публичное акционерное общество",
            CompanyForm::Nko => "Некоммерческая организация",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            CompanyForm::Ooo => "ООО",
            CompanyForm::Ao => "АО",
            CompanyForm::Pao => "ПАО",
            CompanyForm::Nko => "НКО",
        }
    }
}

/// Entity type of a contract party. Kind-specific required fields live on
/// the variant, so a company without a trading name cannot be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartyKind {
    SoleProprietor,
    Company {
        form: CompanyForm,
        /// Trading name without the legal form and quotes
        company_name: String,
        /// Representative title, genitive ("Генерального директора")
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<String>,
        /// Basis of authority, genitive ("Устава")
        #[serde(default, skip_serializing_if = "Option::is_none")]
        acting_basis: Option<String>,
    },
    PrivateIndividual {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identity_document: Option<IdentityDocument>,
    },
}

impl PartyKind {
    /// Short entity-type label: "ИП", "ООО", ... "Физлицо"
    pub fn label(&self) -> &'static str {
        match self {
            PartyKind::SoleProprietor => "ИП",
            PartyKind::Company { form, .. } => form.short_name(),
            PartyKind::PrivateIndividual { .. } => "Физлицо",
        }
    }

    /// Stable machine code of the entity type
    pub fn code(&self) -> &'static str {
        match self {
            PartyKind::SoleProprietor => "ip",
            PartyKind::Company { form, .. } => match form {
                CompanyForm::Ooo => "ooo",
                CompanyForm::Ao => "ao",
                CompanyForm::Pao => "pao",
                CompanyForm::Nko => "nko",
            },
            PartyKind::PrivateIndividual { .. } => "fl",
        }
    }
}

/// Russian personal name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullName {
    pub last: String,
    pub first: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
}

impl FullName {
    pub fn new(last: &str, first: &str, patronymic: Option<&str>) -> Self {
        Self {
            last: last.to_string(),
            first: first.to_string(),
            patronymic: patronymic.map(str::to_string),
        }
    }

    /// "Фамилия Имя Отчество"
    pub fn full(&self) -> String {
        let mut parts = vec![self.last.clone(), self.first.clone()];
        if let Some(ref patronymic) = self.patronymic {
            parts.push(patronymic.clone());
        }
        parts.join(" ")
    }

    /// "Фамилия И.О."
    pub fn initials(&self) -> String {
        let mut out = self.last.clone();
        if let Some(first) = self.first.chars().next() {
            out.push_str(&format!(" {first}."));
        }
        if let Some(initial) = self
            .patronymic
            .as_ref()
            .and_then(|p| p.chars().next())
        {
            out.push_str(&format!("{initial}."));
        }
        out
    }
}

/// Identity document of a private individual
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityDocument {
    pub series: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<NaiveDate>,
}

/// Bank requisites, referenced by a party
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankDetails {
    pub name: String,
    /// 9-digit routing code
    pub bik: String,
    pub correspondent_account: String,
}

/// A contract party (the client side)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub kind: PartyKind,
    /// Full generated legal name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// OGRN for legal entities, OGRNIP for sole proprietors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ogrn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inn: Option<String>,
    /// Legal entities only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpp: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_account: Option<String>,
    /// The individual, or the representative of a legal entity
    pub representative: FullName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
}

impl Party {
    /// Trading name for company parties
    pub fn company_name(&self) -> Option<&str> {
        match &self.kind {
            PartyKind::Company { company_name, .. } => Some(company_name.as_str()),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<&str> {
        match &self.kind {
            PartyKind::Company { position, .. } => position.as_deref(),
            _ => None,
        }
    }

    pub fn acting_basis(&self) -> Option<&str> {
        match &self.kind {
            PartyKind::Company { acting_basis, .. } => acting_basis.as_deref(),
            _ => None,
        }
    }

    pub fn identity_document(&self) -> Option<&IdentityDocument> {
        match &self.kind {
            PartyKind::PrivateIndividual { identity_document } => identity_document.as_ref(),
            _ => None,
        }
    }
}

/// A service line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u32,
    pub name: String,
    /// Exact decimal, two fraction digits
    pub price: Decimal,
    pub payment_terms: String,
}

/// A contract record: immutable input to the generation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub number: String,
    pub date: NaiveDate,
    pub client: Party,
    /// Insertion order is document order
    pub items: Vec<LineItem>,
}

/// The fixed service-provider party (a sole proprietor), supplied by
/// configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Executor {
    pub name: FullName,
    /// Contract signing city line, e.g. "г. Москва"
    pub city: String,
    pub address: String,
    pub inn: String,
    pub ogrnip: String,
    pub email: String,
    pub phone: String,
    pub settlement_account: String,
    pub bank: BankDetails,
    /// Absent for sole proprietors; the payment payload then carries "0"
    pub kpp: Option<String>,
}

impl Executor {
    /// Upper-cased banner form used in requisites and the payment payload
    pub fn legal_name_upper(&self) -> String {
        format!(
            "ИНДИВИДУАЛЬНЫЙ ПРЕДПРИНИМАТЕЛЬ {}",
            self.name.full().to_uppercase()
        )
    }

    /// Signature line name: "Фамилия И.О."
    pub fn signature(&self) -> String {
        self.name.initials()
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            name: FullName::new("Иванов", "Иван", Some("Иванович")),
            city: "г. Москва".to_string(),
            address: "г. Москва, ул. Примерная, д. 1".to_string(),
            inn: "772000000000".to_string(),
            ogrnip: "320774600000000".to_string(),
            email: "mail@example.ru".to_string(),
            phone: "+7 (900) 000-00-00".to_string(),
            settlement_account: "40802810000000000000".to_string(),
            bank: BankDetails {
                name: "АО «Банк»".to_string(),
                bik: "044525000".to_string(),
                correspondent_account: "30101810400000000000".to_string(),
            },
            kpp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_name_renderings() {
        let name = FullName::new("Петров", "Сидор", Some("Павлович"));
        assert_eq!(name.full(), "Петров Сидор Павлович");
        assert_eq!(name.initials(), "Петров С.П.");

        let short = FullName::new("Петров", "Сидор", None);
        assert_eq!(short.full(), "Петров Сидор");
        assert_eq!(short.initials(), "Петров С.");
    }

    #[test]
    fn test_party_kind_labels() {
        assert_eq!(PartyKind::SoleProprietor.label(), "ИП");
        assert_eq!(PartyKind::SoleProprietor.code(), "ip");
        let company = PartyKind::Company {
            form: CompanyForm::Ooo,
            company_name: "Ромашка".to_string(),
            position: None,
            acting_basis: None,
        };
        assert_eq!(company.label(), "ООО");
        assert_eq!(company.code(), "ooo");
    }

    #[test]
    fn test_party_kind_serde_roundtrip() {
        let kind = PartyKind::Company {
            form: CompanyForm::Pao,
            company_name: "Вымпел".to_string(),
            position: Some("Директора".to_string()),
            acting_basis: None,
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains(r#""type":"company""#));
        let back: PartyKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn test_executor_banner() {
        let executor = Executor::default();
        assert_eq!(
            executor.legal_name_upper(),
            "ИНДИВИДУАЛЬНЫЙ ПРЕДПРИНИМАТЕЛЬ ИВАНОВ ИВАН ИВАНОВИЧ"
        );
        assert_eq!(executor.signature(), "Иванов И.И.");
    }
}
