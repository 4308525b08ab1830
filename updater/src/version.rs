//! 버전 비교 유틸리티 (외부 크레이트 없이)
//!
//! 버전 문자열은 최대 세 개의 숫자 구성요소(major.minor.patch)로 해석합니다.
//! 숫자가 아니거나 누락된 구성요소는 0으로 취급하며, 프리릴리스/빌드 메타데이터는
//! 다루지 않습니다.

use std::cmp::Ordering;
use std::fmt;

use crate::manifest::Manifest;

/// 정규화된 3-튜플 버전. 필드 순서대로 사전식 비교된다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// "v1.2.3", "1.2", "abc" 등 어떤 문자열도 받아들이는 관대한 파싱
    pub fn parse_lenient(s: &str) -> Self {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        let mut parts = s.split('.').map(leading_number);

        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }

    /// 원격 매니페스트 검증용 엄격한 파싱: 1~3개의 숫자 구성요소만 허용
    pub fn parse_strict(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        if s.is_empty() {
            return None;
        }

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > 3 {
            return None;
        }
        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok()?;
        }

        Some(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// 구성요소 앞쪽의 숫자만 읽는다 ("3-beta" → 3, "x" → 0)
fn leading_number(part: &str) -> u64 {
    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// 숫자로 시작하는 구성요소가 하나라도 있는지
fn has_numeric_component(s: &str) -> bool {
    let s = s.trim();
    let s = s.strip_prefix('v').unwrap_or(s);
    s.split('.')
        .any(|part| part.chars().next().map_or(false, |c| c.is_ascii_digit()))
}

/// 두 버전 문자열을 정규화된 3-튜플로 비교.
///
/// 숫자 구성요소가 전혀 없는 문자열("abc")은 비교 불가로 보고 동률(Equal)을 반환한다.
/// 따라서 이런 값은 절대 업데이트를 유발하지 않는다.
pub fn compare(a: &str, b: &str) -> Ordering {
    if !has_numeric_component(a) || !has_numeric_component(b) {
        return Ordering::Equal;
    }
    Version::parse_lenient(a).cmp(&Version::parse_lenient(b))
}

/// 현재 설치된 버전 대비 매니페스트의 최신 버전이 새로운지 확인.
/// 아무것도 설치되지 않았다면(빈 문자열) 항상 업데이트 대상이다.
pub fn is_update_available(current: &str, manifest: &Manifest) -> bool {
    current.trim().is_empty() || compare(&manifest.latest_version, current) == Ordering::Greater
}
