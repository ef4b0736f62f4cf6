//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `word`: 단어(Word)
//! - `group`: 단어 그룹(Group)
//! - `study`: 학습 활동 종류, 학습 세션, 단어 복습 기록
//! - `dashboard`: 대시보드 통계 응답
//!
//! `pub use X::*;`로 재공개하므로 `crate::models::Word`처럼 짧게 접근할 수 있습니다.

pub mod dashboard;
pub mod group;
pub mod study;
pub mod word;

pub use dashboard::*;
pub use group::*;
pub use study::*;
pub use word::*;

use serde::{Deserialize, Deserializer};

/// PATCH 요청에서 "필드 누락"과 "명시적 null"을 구분하는 역직렬화 함수
///
/// `#[serde(default, deserialize_with = "nullable")]`과 함께 씁니다.
/// - 필드 없음 → `None` (변경하지 않음)
/// - `null` → `Some(None)` (NULL로 설정)
/// - 값 → `Some(Some(v))`
///
/// serde 기본 동작은 `null`도 바깥 `None`으로 합쳐 버리므로 따로 필요합니다.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_distinguishes_missing_from_null() {
        let missing: UpdateGroupRequest = serde_json::from_str(r#"{ "name": "nimi" }"#).unwrap();
        assert_eq!(missing.description, None);

        let null: UpdateGroupRequest = serde_json::from_str(r#"{ "description": null }"#).unwrap();
        assert_eq!(null.description, Some(None));
        assert_eq!(null.name, None);

        let null_name: UpdateGroupRequest = serde_json::from_str(r#"{ "name": null }"#).unwrap();
        assert_eq!(null_name.name, Some(None));

        let value: UpdateGroupRequest =
            serde_json::from_str(r#"{ "description": "ijo pona" }"#).unwrap();
        assert_eq!(value.description, Some(Some("ijo pona".to_string())));
    }
}
