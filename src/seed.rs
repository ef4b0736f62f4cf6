//! # 예제 데이터 채우기
//!
//! `SEED_DATABASE=1`로 서버를 띄우면 빈 데이터베이스에 예제 그룹, 단어, 학습 활동을 넣습니다.
//! 이미 데이터가 있으면 아무것도 하지 않습니다.

use crate::db::groups::link_word;
use crate::db::repository;
use crate::db::store::begin_write;
use crate::db::Store;
use crate::error::AppError;
use crate::models::*;
use serde_json::json;

struct SeedWord {
    toki_pona: &'static str,
    english: &'static str,
    definition: &'static str,
}

const BASIC_WORDS: &[SeedWord] = &[
    SeedWord {
        toki_pona: "pona",
        english: "good",
        definition: "good, positive, useful; simple; to fix",
    },
    SeedWord {
        toki_pona: "ike",
        english: "bad",
        definition: "bad, negative; complex",
    },
    SeedWord {
        toki_pona: "jan",
        english: "person",
        definition: "human being, person, somebody",
    },
    SeedWord {
        toki_pona: "moku",
        english: "food",
        definition: "to eat, to drink; food",
    },
];

const NATURE_WORDS: &[SeedWord] = &[
    SeedWord {
        toki_pona: "telo",
        english: "water",
        definition: "water, liquid; to wash",
    },
    SeedWord {
        toki_pona: "suno",
        english: "sun",
        definition: "sun, light, brightness",
    },
    SeedWord {
        toki_pona: "kasi",
        english: "plant",
        definition: "plant, vegetation, leaf",
    },
    SeedWord {
        toki_pona: "ma",
        english: "land",
        definition: "earth, land, country, outdoors",
    },
];

/// 단어, 그룹, 학습 활동 테이블이 모두 비어 있을 때만 예제 데이터를 넣습니다. 넣었으면 `true`.
///
/// 검사와 삽입 전체가 쓰기 트랜잭션 하나라서, 중간에 실패하거나 프로세스가 죽으면
/// 아무것도 남지 않고 다음 시작 때 처음부터 다시 채웁니다.
pub async fn seed_if_empty(store: &Store) -> Result<bool, AppError> {
    let mut tx = begin_write(store.pool()).await?;

    let existing: i64 = sqlx::query_scalar(
        r#"
        SELECT (SELECT COUNT(*) FROM words)
             + (SELECT COUNT(*) FROM groups)
             + (SELECT COUNT(*) FROM study_activities)
        "#,
    )
    .fetch_one(&mut *tx)
    .await?;
    if existing > 0 {
        tracing::debug!(existing, "store already has data, skipping seed");
        return Ok(false);
    }

    for (name, description, entries) in [
        ("Basic Words", "Everyday core vocabulary", BASIC_WORDS),
        ("Nature", "The natural world", NATURE_WORDS),
    ] {
        let group = repository::insert::<Group>(
            &mut tx,
            &CreateGroupRequest {
                name: name.to_string(),
                description: Some(description.to_string()),
            },
        )
        .await?;

        for entry in entries {
            let input = CreateWordRequest {
                components: Some(json!({ "root": entry.toki_pona })),
                ..CreateWordRequest::new(entry.toki_pona, entry.english)
                    .definition(entry.definition)
            };
            let word = repository::insert::<Word>(&mut tx, &input).await?;
            link_word(&mut tx, &group.id, &word.id).await?;
        }
    }

    for (name, description) in [
        ("Flashcards", "Flip cards from toki pona to English"),
        ("Listening", "Pick the word you hear"),
    ] {
        repository::insert::<StudyActivity>(
            &mut tx,
            &CreateStudyActivityRequest {
                name: name.to_string(),
                url: None,
                description: Some(description.to_string()),
            },
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        words = BASIC_WORDS.len() + NATURE_WORDS.len(),
        "seeded example vocabulary"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::test_store;
    use crate::db::{Dashboard, GroupRepo, StudyActivityRepo};

    #[tokio::test]
    async fn seeds_once() {
        let (store, _dir) = test_store().await;

        assert!(seed_if_empty(&store).await.unwrap());
        assert!(!seed_if_empty(&store).await.unwrap());

        let dashboard = Dashboard::new(&store);
        assert_eq!(dashboard.total_vocabulary().await.unwrap(), 8);

        let basic = GroupRepo::new(&store)
            .get_by_name("Basic Words")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(basic.words_count, 4);
        assert!(StudyActivityRepo::new(&store)
            .get_by_name("Flashcards")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn existing_group_without_words_skips_seed() {
        let (store, _dir) = test_store().await;
        GroupRepo::new(&store)
            .create(&CreateGroupRequest::named("Basic Words"))
            .await
            .unwrap();

        assert!(!seed_if_empty(&store).await.unwrap());

        let dashboard = Dashboard::new(&store);
        assert_eq!(dashboard.total_vocabulary().await.unwrap(), 0);
        assert!(StudyActivityRepo::new(&store)
            .get_by_name("Flashcards")
            .await
            .unwrap()
            .is_none());
    }
}
