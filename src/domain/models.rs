use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::form::{FieldKind, FieldSpec, FormData, RangeSpec};
use super::validation::{FieldRules, PHONE_PATTERN};

/// Inclusive range, step 100, for the loan amount slider.
pub const AMOUNT_RANGE: RangeSpec = RangeSpec { min: 200, max: 1000, step: 100 };
/// Inclusive range, step 1, for the loan term slider.
pub const TERM_RANGE: RangeSpec = RangeSpec { min: 10, max: 30, step: 1 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Мужской",
            Gender::Female => "Женский",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Personal details collected on the first screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalData {
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(serialize_with = "serialize_gender", deserialize_with = "deserialize_gender")]
    pub gender: Option<Gender>,
}

// An unselected gender is stored as "" so the blob keeps the same shape.
fn serialize_gender<S>(gender: &Option<Gender>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(gender.map(Gender::as_str).unwrap_or(""))
}

fn deserialize_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Gender::parse))
}

const PERSONAL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "phone",
        label: "Телефон",
        placeholder: "+7 (999) 999 9999",
        kind: FieldKind::Phone,
        rules: FieldRules {
            required: Some("Телефон обязателен"),
            pattern: Some(PHONE_PATTERN),
        },
    },
    FieldSpec {
        name: "firstName",
        label: "Имя",
        placeholder: "",
        kind: FieldKind::Text,
        rules: FieldRules::required("Имя обязательно"),
    },
    FieldSpec {
        name: "lastName",
        label: "Фамилия",
        placeholder: "",
        kind: FieldKind::Text,
        rules: FieldRules::required("Фамилия обязательна"),
    },
    FieldSpec {
        name: "gender",
        label: "Пол",
        placeholder: "Выберите пол",
        kind: FieldKind::Select,
        rules: FieldRules::required("Пол обязателен"),
    },
];

impl FormData for PersonalData {
    const STORAGE_KEY: &'static str = "personalData";

    fn fields() -> &'static [FieldSpec] {
        PERSONAL_FIELDS
    }

    fn value(&self, field: &str) -> String {
        match field {
            "phone" => self.phone.clone(),
            "firstName" => self.first_name.clone(),
            "lastName" => self.last_name.clone(),
            "gender" => self.gender.map(Gender::as_str).unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, field: &str, value: String) {
        match field {
            "phone" => self.phone = value,
            "firstName" => self.first_name = value,
            "lastName" => self.last_name = value,
            "gender" => self.gender = Gender::parse(&value),
            _ => {}
        }
    }
}

/// Workplace and home address collected on the second screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressWorkData {
    pub workplace: String,
    pub address: String,
}

const ADDRESS_WORK_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "workplace",
        label: "Место работы",
        placeholder: "Выберите место работы",
        kind: FieldKind::Select,
        rules: FieldRules::required("Место работы обязательно"),
    },
    FieldSpec {
        name: "address",
        label: "Адрес проживания",
        placeholder: "",
        kind: FieldKind::Text,
        rules: FieldRules::required("Адрес обязателен"),
    },
];

impl FormData for AddressWorkData {
    const STORAGE_KEY: &'static str = "addressWorkData";

    fn fields() -> &'static [FieldSpec] {
        ADDRESS_WORK_FIELDS
    }

    fn value(&self, field: &str) -> String {
        match field {
            "workplace" => self.workplace.clone(),
            "address" => self.address.clone(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, field: &str, value: String) {
        match field {
            "workplace" => self.workplace = value,
            "address" => self.address = value,
            _ => {}
        }
    }
}

/// Amount and term chosen on the last screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanParameters {
    #[serde(default = "default_loan_amount")]
    pub loan_amount: u32,
    #[serde(default = "default_loan_term")]
    pub loan_term: u32,
}

fn default_loan_amount() -> u32 {
    AMOUNT_RANGE.min
}

fn default_loan_term() -> u32 {
    TERM_RANGE.min
}

impl Default for LoanParameters {
    fn default() -> Self {
        Self {
            loan_amount: default_loan_amount(),
            loan_term: default_loan_term(),
        }
    }
}

impl LoanParameters {
    /// Returns a copy with both values clamped and aligned to their slider steps.
    pub fn snapped(self) -> Self {
        Self {
            loan_amount: AMOUNT_RANGE.snap(self.loan_amount),
            loan_term: TERM_RANGE.snap(self.loan_term),
        }
    }
}

const LOAN_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "loanAmount",
        label: "Сумма займа",
        placeholder: "",
        kind: FieldKind::Range(AMOUNT_RANGE),
        rules: FieldRules::required("Сумма займа обязательна"),
    },
    FieldSpec {
        name: "loanTerm",
        label: "Срок займа",
        placeholder: "",
        kind: FieldKind::Range(TERM_RANGE),
        rules: FieldRules::required("Срок займа обязателен"),
    },
];

impl FormData for LoanParameters {
    const STORAGE_KEY: &'static str = "loanParameters";

    fn fields() -> &'static [FieldSpec] {
        LOAN_FIELDS
    }

    fn value(&self, field: &str) -> String {
        match field {
            "loanAmount" => self.loan_amount.to_string(),
            "loanTerm" => self.loan_term.to_string(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, field: &str, value: String) {
        let Ok(parsed) = value.trim().parse::<u32>() else {
            return;
        };
        match field {
            "loanAmount" => self.loan_amount = AMOUNT_RANGE.snap(parsed),
            "loanTerm" => self.loan_term = TERM_RANGE.snap(parsed),
            _ => {}
        }
    }
}

/// One option of the workplace catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workplace {
    pub slug: String,
    pub name: String,
    pub url: String,
}

/// The three wizard steps, addressed by their route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Personal,
    AddressWork,
    LoanParameters,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Personal, Route::AddressWork, Route::LoanParameters];

    pub fn path(self) -> &'static str {
        match self {
            Route::Personal => "/",
            Route::AddressWork => "/address-work",
            Route::LoanParameters => "/loan-parameters",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// 1-based position in the wizard.
    pub fn step(self) -> usize {
        match self {
            Route::Personal => 1,
            Route::AddressWork => 2,
            Route::LoanParameters => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Personal => "Личные данные",
            Route::AddressWork => "Адрес и место работы",
            Route::LoanParameters => "Параметры займа",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Route::Personal => Some(Route::AddressWork),
            Route::AddressWork => Some(Route::LoanParameters),
            Route::LoanParameters => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Route::Personal => None,
            Route::AddressWork => Some(Route::Personal),
            Route::LoanParameters => Some(Route::AddressWork),
        }
    }
}

/// Title sent to the create endpoint for an application.
pub fn application_title(personal: &PersonalData) -> String {
    format!("{} {}", personal.first_name, personal.last_name)
}

/// Text shown in the confirmation dialog once an application is accepted.
pub fn approval_message(personal: &PersonalData, params: &LoanParameters) -> String {
    format!(
        "Поздравляем, {} {}. Вам одобрено {}₽ на {} дней.",
        personal.last_name, personal.first_name, params.loan_amount, params.loan_term
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ivan() -> PersonalData {
        PersonalData {
            phone: "+7 (999) 123 4567".to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            gender: Some(Gender::Male),
        }
    }

    #[test]
    fn test_personal_data_json_shape() {
        let json = serde_json::to_value(ivan()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "phone": "+7 (999) 123 4567",
                "firstName": "Ivan",
                "lastName": "Petrov",
                "gender": "male"
            })
        );
    }

    #[test]
    fn test_unset_gender_accepts_empty_and_null() {
        let empty: PersonalData = serde_json::from_str(r#"{"gender": ""}"#).unwrap();
        assert_eq!(empty.gender, None);
        let null: PersonalData = serde_json::from_str(r#"{"gender": null}"#).unwrap();
        assert_eq!(null.gender, None);
        assert_eq!(serde_json::to_value(&empty).unwrap()["gender"], "");
    }

    #[test]
    fn test_loan_parameters_defaults_for_missing_fields() {
        let params: LoanParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(params, LoanParameters { loan_amount: 200, loan_term: 10 });

        let partial: LoanParameters = serde_json::from_str(r#"{"loanTerm": 25}"#).unwrap();
        assert_eq!(partial.loan_amount, 200);
        assert_eq!(partial.loan_term, 25);
    }

    #[test]
    fn test_loan_parameters_snapped() {
        let params = LoanParameters { loan_amount: 5000, loan_term: 3 }.snapped();
        assert_eq!(params, LoanParameters { loan_amount: 1000, loan_term: 10 });

        let params = LoanParameters { loan_amount: 449, loan_term: 20 }.snapped();
        assert_eq!(params.loan_amount, 400);
    }

    #[test]
    fn test_set_value_snaps_ranges() {
        let mut params = LoanParameters::default();
        params.set_value("loanAmount", "750".to_string());
        assert_eq!(params.loan_amount, 800);
        params.set_value("loanTerm", "not a number".to_string());
        assert_eq!(params.loan_term, 10);
    }

    #[test]
    fn test_form_data_accessors() {
        let mut data = AddressWorkData::default();
        data.set_value("workplace", "laptops".to_string());
        data.set_value("address", "Moscow".to_string());
        assert_eq!(data.value("workplace"), "laptops");
        assert_eq!(data.value("address"), "Moscow");

        let mut personal = PersonalData::default();
        personal.set_value("gender", "female".to_string());
        assert_eq!(personal.gender, Some(Gender::Female));
        personal.set_value("gender", "unknown".to_string());
        assert_eq!(personal.gender, None);
    }

    #[test]
    fn test_route_paths() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nowhere"), None);
        assert_eq!(Route::Personal.next(), Some(Route::AddressWork));
        assert_eq!(Route::LoanParameters.next(), None);
        assert_eq!(Route::LoanParameters.previous(), Some(Route::AddressWork));
        assert_eq!(Route::Personal.previous(), None);
    }

    #[test]
    fn test_approval_message() {
        let params = LoanParameters { loan_amount: 500, loan_term: 20 };
        assert_eq!(
            approval_message(&ivan(), &params),
            "Поздравляем, Petrov Ivan. Вам одобрено 500₽ на 20 дней."
        );
        assert_eq!(application_title(&ivan()), "Ivan Petrov");
    }
}
