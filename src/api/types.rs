// Paperlib - Academic paper library client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Wire models of the paper service
//!
//! Field names follow the service's JSON (snake_case, `_id` for document ids,
//! PascalCase keys for external ids).

use crate::error::{PaperlibError, Result};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// PAGINATION
// ============================================================================

/// Paginated list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
}

/// `offset`/`limit` query parameters accepted by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 100;

    /// Create a page request
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `1 <= limit <= 100`.
    pub fn new(offset: u32, limit: u32) -> Result<Self> {
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(PaperlibError::invalid_input(format!(
                "limit must be between 1 and {}, got {}",
                Self::MAX_LIMIT,
                limit
            )));
        }
        Ok(Self { offset, limit })
    }

    /// The page following this one
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::MAX_LIMIT,
        }
    }
}

// ============================================================================
// USERS
// ============================================================================

/// Links to external researcher profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRefs {
    pub orcid: Option<String>,
    pub google_scholar: Option<String>,
    pub researchgate: Option<String>,
    pub linkedin: Option<String>,
}

lazy_static! {
    static ref ORCID_RE: Regex =
        Regex::new(r"^https://orcid\.org/(\d{4}-){3}\d{3}(\d|X)$").expect("valid regex");
    static ref GOOGLE_SCHOLAR_RE: Regex = Regex::new(
        r"^https://scholar\.google\.[a-z]{2,3}/citations\?hl=[a-z]{2}(&user=[A-Za-z0-9]+)?$"
    )
    .expect("valid regex");
    static ref LINKEDIN_RE: Regex =
        Regex::new(r"^https://www\.linkedin\.com/in/[A-Za-z0-9-]+/?$").expect("valid regex");
    static ref RESEARCHGATE_RE: Regex =
        Regex::new(r"^https://www\.researchgate\.net/profile/[A-Za-z0-9-]+$").expect("valid regex");
}

impl UserRefs {
    /// Check every present link against the format of its site
    ///
    /// Empty links count as absent.
    ///
    /// # Errors
    /// Returns `InvalidInput` naming the first malformed link.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, &Option<String>, &Regex); 4] = [
            ("orcid", &self.orcid, &ORCID_RE),
            ("google_scholar", &self.google_scholar, &GOOGLE_SCHOLAR_RE),
            ("researchgate", &self.researchgate, &RESEARCHGATE_RE),
            ("linkedin", &self.linkedin, &LINKEDIN_RE),
        ];

        for (field, value, pattern) in checks {
            match value.as_deref() {
                Some(link) if !link.is_empty() && !pattern.is_match(link) => {
                    return Err(PaperlibError::invalid_input(format!(
                        "{field} link is not valid: {link}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Academic title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserTitle {
    BSc,
    MSc,
    Phd,
    Postdoc,
    Prof,
}

/// Research field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserField {
    Cs,
    Md,
    Ch,
    Bi,
    Ms,
    Ph,
    Ge,
    Ps,
    Ar,
    Hi,
    Gg,
    So,
    Bu,
    Po,
    Ec,
    Pl,
    Ma,
    En,
    Es,
    Af,
    Ed,
    La,
    Li,
}

impl UserField {
    pub const ALL: [UserField; 23] = [
        Self::Cs,
        Self::Md,
        Self::Ch,
        Self::Bi,
        Self::Ms,
        Self::Ph,
        Self::Ge,
        Self::Ps,
        Self::Ar,
        Self::Hi,
        Self::Gg,
        Self::So,
        Self::Bu,
        Self::Po,
        Self::Ec,
        Self::Pl,
        Self::Ma,
        Self::En,
        Self::Es,
        Self::Af,
        Self::Ed,
        Self::La,
        Self::Li,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub refs: UserRefs,
    pub fields: Vec<UserField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<UserTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of `POST /users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserBody {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub refs: UserRefs,
    pub fields: Vec<UserField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<UserTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Body of `PATCH /users`; absent fields stay unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<UserRefs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<UserField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<UserTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

// ============================================================================
// PAPERS
// ============================================================================

/// Identifiers of a paper in external catalogues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(rename = "ArXiv", default)]
    pub arxiv: Option<String>,
    #[serde(rename = "MAG", default)]
    pub mag: Option<String>,
    #[serde(rename = "ACL", default)]
    pub acl: Option<String>,
    #[serde(rename = "PubMed", default)]
    pub pubmed: Option<String>,
    #[serde(rename = "Medline", default)]
    pub medline: Option<String>,
    #[serde(rename = "PubMedCentral", default)]
    pub pubmed_central: Option<String>,
    #[serde(rename = "DBLP", default)]
    pub dblp: Option<String>,
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicationType {
    Review,
    JournalArticle,
    CaseReport,
    ClinicalTrial,
    Conference,
    Dataset,
    Editorial,
    LettersAndComments,
    MetaAnalysis,
    News,
    Study,
    Book,
    BookSection,
}

impl PublicationType {
    pub const ALL: [PublicationType; 13] = [
        Self::Review,
        Self::JournalArticle,
        Self::CaseReport,
        Self::ClinicalTrial,
        Self::Conference,
        Self::Dataset,
        Self::Editorial,
        Self::LettersAndComments,
        Self::MetaAnalysis,
        Self::News,
        Self::Study,
        Self::Book,
        Self::BookSection,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueType {
    Journal,
    Conference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub alternate_names: Vec<String>,
    #[serde(default)]
    pub alternate_urls: Vec<String>,
    #[serde(default)]
    pub issn: Option<String>,
    #[serde(rename = "type", default)]
    pub venue_type: Option<VenueType>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub external_ids: ExternalIds,
    pub title: String,
    pub authors: Vec<String>,
    pub citations: u64,
    #[serde(default)]
    pub publication_types: Vec<PublicationType>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub r#abstract: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub open_pdf_url: Option<String>,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub bibtex: Option<String>,
}

/// Entry of `GET /papers/autocomplete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperAutocomplete {
    pub id: String,
    pub title: String,
    pub authors_year: String,
}

/// Body of `POST /papers/search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperSearchBody {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_types: Option<Vec<PublicationType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_access_pdf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venues: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields_of_study: Option<Vec<UserField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date_end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_citation_count: Option<u64>,
}

impl PaperSearchBody {
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// LIBRARIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub default: bool,
    pub created_at: DateTime<Utc>,
    pub private: bool,
    #[serde(default)]
    pub num_papers: u64,
    /// Set when the library was listed relative to a paper
    #[serde(default)]
    pub contains_paper: Option<bool>,
}

/// Body of `POST /libraries`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLibraryBody {
    pub title: String,
    pub private: bool,
}

/// Body of `PATCH /libraries/{id}`; absent fields stay unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLibraryBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
}

/// Body of `POST /libraries/{id}` and `PATCH /libraries/{id}/remove-papers`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryPapersBody {
    pub paper_ids: Vec<String>,
}

// ============================================================================
// LIKES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBasicInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperBasicInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// `GET /likes/paper/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperLikes {
    pub total_likes: u64,
    pub users: Vec<UserBasicInfo>,
}

/// `GET /likes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLikes {
    pub total_likes: u64,
    pub papers: Vec<PaperBasicInfo>,
}
