//! # sona
//!
//! 토키 포나(Toki Pona) 어휘와 학습 기록을 관리하는 서버의 라이브러리 부분입니다.
//! 실행 파일(`main.rs`)과 통합 테스트(`tests/`)가 함께 씁니다.
//!
//! - `config`: 환경변수 설정
//! - `db`: 저장소(Store)와 범용/도메인 저장소, 대시보드 집계
//! - `error`: 에러 타입과 HTTP 응답 변환
//! - `models`: 엔티티와 요청/응답 구조체
//! - `routes`: HTTP 핸들러와 API 라우터
//! - `seed`: 예제 데이터

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod seed;
