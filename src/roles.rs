//! Column role inference from column names.
//!
//! Checkers decide which rules apply to a column by looking at its name:
//! a column called `birth_year` gets year-range validation, `email` gets
//! format validation and PII scanning, `updated_at` drives freshness. Roles
//! are inferred by case-insensitive substring matching against keyword
//! lists that cover both English and Korean naming conventions, and a
//! column may carry any number of roles at once.

use std::collections::{BTreeMap, BTreeSet};

/// Category of sensitive data a column may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensitiveCategory {
    /// Credentials and secrets.
    Password,
    /// Account and banking details.
    Account,
    /// Salary and income figures.
    Income,
    /// Health and disease records.
    Health,
    /// Coordinates and other location data.
    Location,
}

impl SensitiveCategory {
    /// Stable label used in issue details.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Account => "account",
            Self::Income => "income",
            Self::Health => "health",
            Self::Location => "location",
        }
    }
}

/// Semantic role of a column, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Row identifier (id, key, uuid).
    Identifier,
    /// Categorical code (code, cd).
    Code,
    /// Y/N style flag (yn suffix).
    Flag,
    /// Date or timestamp.
    Date,
    /// Last-modification timestamp.
    Updated,
    /// Planned or scheduled date, allowed to lie in the future.
    Scheduled,
    /// Start of a date range.
    RangeStart,
    /// End of a date range.
    RangeEnd,
    /// Disposal or deletion date.
    DiscardDate,
    /// Disposal or deletion reason.
    DiscardReason,
    /// Monetary amount.
    Amount,
    /// Percentage or ratio.
    Percentage,
    /// Person age.
    Age,
    /// Count or quantity.
    Count,
    /// Calendar year.
    Year,
    /// Year of birth.
    BirthYear,
    /// Year of enrollment or registration.
    EnrollmentYear,
    /// Free-text name.
    NameText,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Personally identifiable information.
    Pii,
    /// Sensitive data of a specific category.
    Sensitive(SensitiveCategory),
}

impl Role {
    /// Stable label used in issue details and reports.
    pub fn label(&self) -> String {
        match self {
            Self::Identifier => "identifier".to_string(),
            Self::Code => "code".to_string(),
            Self::Flag => "flag".to_string(),
            Self::Date => "date".to_string(),
            Self::Updated => "updated".to_string(),
            Self::Scheduled => "scheduled".to_string(),
            Self::RangeStart => "range-start".to_string(),
            Self::RangeEnd => "range-end".to_string(),
            Self::DiscardDate => "discard-date".to_string(),
            Self::DiscardReason => "discard-reason".to_string(),
            Self::Amount => "amount".to_string(),
            Self::Percentage => "percentage".to_string(),
            Self::Age => "age".to_string(),
            Self::Count => "count".to_string(),
            Self::Year => "year".to_string(),
            Self::BirthYear => "birth-year".to_string(),
            Self::EnrollmentYear => "enrollment-year".to_string(),
            Self::NameText => "name-text".to_string(),
            Self::Email => "email".to_string(),
            Self::Phone => "phone".to_string(),
            Self::Pii => "pii".to_string(),
            Self::Sensitive(category) => format!("sensitive:{}", category.name()),
        }
    }
}

/// Keyword table driving role inference.
///
/// The default table covers common English and Korean column naming. All
/// matching is case-insensitive substring containment against the full
/// column name.
#[derive(Debug, Clone)]
pub struct RoleTable {
    keywords: BTreeMap<Role, Vec<String>>,
}

impl Default for RoleTable {
    fn default() -> Self {
        let mut keywords = BTreeMap::new();

        let mut add = |role: Role, words: &[&str]| {
            keywords.insert(role, words.iter().map(|w| (*w).to_string()).collect());
        };

        add(Role::Identifier, &["id", "key", "uuid", "guid", "no", "번호"]);
        add(Role::Code, &["code", "cd", "코드", "구분"]);
        add(Role::Flag, &["yn", "여부", "유무"]);
        add(
            Role::Date,
            &[
                "date", "dt", "time", "일자", "날짜", "시간", "created", "updated",
                "modified", "등록", "수정", "생성",
            ],
        );
        add(Role::Updated, &["updated", "modified", "수정", "갱신"]);
        add(
            Role::Scheduled,
            &["scheduled", "planned", "expected", "예약", "예정"],
        );
        add(Role::RangeStart, &["start", "from", "시작", "등록", "착공"]);
        add(Role::RangeEnd, &["end", "to", "종료", "완료", "준공"]);
        add(Role::DiscardDate, &["delete_date", "폐기일", "삭제일"]);
        add(
            Role::DiscardReason,
            &["delete_reason", "폐기사유", "폐기이유", "삭제사유"],
        );
        add(Role::Amount, &["amount", "amt", "price", "금액", "가격"]);
        add(Role::Percentage, &["rate", "ratio", "percent", "%", "율"]);
        add(Role::Age, &["age", "나이"]);
        add(
            Role::Count,
            &["count", "quantity", "수량", "건수", "횟수"],
        );
        add(
            Role::Year,
            &[
                "year", "join_year", "birth_year", "년도", "연도", "가입년도", "생년",
            ],
        );
        add(Role::BirthYear, &["birth", "생년", "출생"]);
        add(
            Role::EnrollmentYear,
            &["join", "register", "가입", "등록"],
        );
        add(
            Role::NameText,
            &["name", "이름", "성명", "직위", "부서", "명칭"],
        );
        add(Role::Email, &["email", "mail", "이메일"]);
        add(
            Role::Phone,
            &["phone", "tel", "전화", "연락처", "휴대폰"],
        );
        add(
            Role::Pii,
            &[
                "ssn", "rrn", "주민", "email", "이메일", "phone", "tel", "전화",
                "card", "카드",
            ],
        );
        add(
            Role::Sensitive(SensitiveCategory::Password),
            &["password", "pwd", "비밀번호", "패스워드"],
        );
        add(
            Role::Sensitive(SensitiveCategory::Account),
            &["account", "bank", "계좌"],
        );
        add(
            Role::Sensitive(SensitiveCategory::Income),
            &["income", "salary", "소득", "연봉"],
        );
        add(
            Role::Sensitive(SensitiveCategory::Health),
            &["health", "disease", "건강", "질병"],
        );
        add(
            Role::Sensitive(SensitiveCategory::Location),
            &["location", "gps", "latitude", "longitude", "위치", "좌표"],
        );

        Self { keywords }
    }
}

impl RoleTable {
    /// Builds a table with the default keyword lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the keyword list for one role.
    #[must_use]
    pub fn with_keywords(mut self, role: Role, words: &[&str]) -> Self {
        self.keywords
            .insert(role, words.iter().map(|w| w.to_lowercase()).collect());
        self
    }

    /// Appends one keyword to a role's list.
    pub fn add_keyword(&mut self, role: Role, word: impl Into<String>) {
        self.keywords
            .entry(role)
            .or_default()
            .push(word.into().to_lowercase());
    }

    /// Infers every role whose keyword list matches the column name.
    pub fn infer(&self, column_name: &str) -> BTreeSet<Role> {
        let lower = column_name.to_lowercase();
        self.keywords
            .iter()
            .filter(|(_, words)| words.iter().any(|w| lower.contains(w.as_str())))
            .map(|(role, _)| *role)
            .collect()
    }
}

/// Infers roles for a column name using the default keyword table.
pub fn infer_roles(column_name: &str) -> BTreeSet<Role> {
    RoleTable::default().infer(column_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_detection() {
        assert!(infer_roles("user_id").contains(&Role::Identifier));
        assert!(infer_roles("ORDER_KEY").contains(&Role::Identifier));
        assert!(infer_roles("주문번호").contains(&Role::Identifier));
        assert!(!infer_roles("amount").contains(&Role::Identifier));
    }

    #[test]
    fn test_case_insensitive_matching() {
        assert!(infer_roles("Email_Address").contains(&Role::Email));
        assert!(infer_roles("BIRTH_YEAR").contains(&Role::BirthYear));
    }

    #[test]
    fn test_multiple_roles_for_one_name() {
        let roles = infer_roles("birth_year");
        assert!(roles.contains(&Role::Year));
        assert!(roles.contains(&Role::BirthYear));

        // "email" is both a format role and a PII keyword
        let roles = infer_roles("email");
        assert!(roles.contains(&Role::Email));
        assert!(roles.contains(&Role::Pii));
    }

    #[test]
    fn test_korean_keywords() {
        assert!(infer_roles("등록일자").contains(&Role::Date));
        assert!(infer_roles("사용여부").contains(&Role::Flag));
        assert!(infer_roles("연봉").contains(&Role::Sensitive(SensitiveCategory::Income)));
        assert!(infer_roles("휴대폰").contains(&Role::Phone));
    }

    #[test]
    fn test_sensitive_categories() {
        assert!(
            infer_roles("user_password").contains(&Role::Sensitive(SensitiveCategory::Password))
        );
        assert!(
            infer_roles("bank_account").contains(&Role::Sensitive(SensitiveCategory::Account))
        );
        assert!(
            infer_roles("gps_latitude").contains(&Role::Sensitive(SensitiveCategory::Location))
        );
        assert!(
            infer_roles("disease_history").contains(&Role::Sensitive(SensitiveCategory::Health))
        );
    }

    #[test]
    fn test_scheduled_vs_plain_date() {
        let roles = infer_roles("scheduled_date");
        assert!(roles.contains(&Role::Scheduled));
        assert!(roles.contains(&Role::Date));

        let roles = infer_roles("created_date");
        assert!(roles.contains(&Role::Date));
        assert!(!roles.contains(&Role::Scheduled));
    }

    #[test]
    fn test_custom_keywords() {
        let table = RoleTable::new().with_keywords(Role::Identifier, &["pk"]);
        assert!(table.infer("row_pk").contains(&Role::Identifier));
        assert!(!table.infer("user_id").contains(&Role::Identifier));

        let mut table = RoleTable::new();
        table.add_keyword(Role::Email, "courriel");
        assert!(table.infer("courriel_client").contains(&Role::Email));
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Identifier.label(), "identifier");
        assert_eq!(Role::RangeStart.label(), "range-start");
        assert_eq!(
            Role::Sensitive(SensitiveCategory::Password).label(),
            "sensitive:password"
        );
    }

    #[test]
    fn test_no_roles_for_plain_name() {
        assert!(infer_roles("foo").is_empty());
    }
}
