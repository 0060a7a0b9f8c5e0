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


//! Human-readable labels and external links for wire enums

use crate::api::types::{Paper, PublicationType, UserField, UserTitle};
use serde::Serialize;

impl UserTitle {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BSc => "Bachelor of Science (B.Sc.)",
            Self::MSc => "Master of Science (M.Sc.)",
            Self::Phd => "Doctor of Philosophy (Ph.D.)",
            Self::Postdoc => "Postdoctoral Researcher (Postdoc)",
            Self::Prof => "Professor (Prof.)",
        }
    }
}

impl UserField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cs => "Computer Science",
            Self::Md => "Medicine",
            Self::Ch => "Chemistry",
            Self::Bi => "Biology",
            Self::Ms => "Material Science",
            Self::Ph => "Physics",
            Self::Ge => "Geology",
            Self::Ps => "Psychology",
            Self::Ar => "Art",
            Self::Hi => "History",
            Self::Gg => "Geography",
            Self::So => "Sociology",
            Self::Bu => "Business",
            Self::Po => "Political Science",
            Self::Ec => "Economics",
            Self::Pl => "Philosophy",
            Self::Ma => "Mathematics",
            Self::En => "Engineering",
            Self::Es => "Environmental Science",
            Self::Af => "Agriculture and Food",
            Self::Ed => "Education",
            Self::La => "Law",
            Self::Li => "Linguistics",
        }
    }
}

impl PublicationType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Review => "Review",
            Self::JournalArticle => "Journal Article",
            Self::CaseReport => "Case Report",
            Self::ClinicalTrial => "Clinical Trial",
            Self::Conference => "Conference",
            Self::Dataset => "Dataset",
            Self::Editorial => "Editorial",
            Self::LettersAndComments => "Letters and Comments",
            Self::MetaAnalysis => "Meta Analysis",
            Self::News => "News",
            Self::Study => "Study",
            Self::Book => "Book",
            Self::BookSection => "Book Section",
        }
    }
}

const EXTERNAL_LINK_ICON: &str = "pi pi-external-link";
const PDF_ICON: &str = "pi pi-file-pdf";

/// Catalogue that can resolve an external paper id to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalogue {
    ArXiv,
    Mag,
    Acl,
    PubMed,
    Medline,
    PubMedCentral,
    Dblp,
    Doi,
}

impl Catalogue {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ArXiv => "ArXiv",
            Self::Mag => "Microsoft Academic Graph",
            Self::Acl => "ACL Anthology",
            Self::PubMed => "PubMed",
            Self::Medline => "Medline",
            Self::PubMedCentral => "PubMed Central",
            Self::Dblp => "DBLP",
            Self::Doi => "DOI",
        }
    }

    pub fn url(&self, id: &str) -> String {
        match self {
            Self::ArXiv => format!("https://arxiv.org/abs/{id}"),
            Self::Mag => format!("https://academic.microsoft.com/paper/{id}"),
            Self::Acl => format!("https://aclanthology.org/{id}"),
            Self::PubMed | Self::Medline => format!("https://pubmed.ncbi.nlm.nih.gov/{id}"),
            Self::PubMedCentral => format!("https://www.ncbi.nlm.nih.gov/pmc/articles/{id}"),
            Self::Dblp => format!("https://dblp.org/rec/{id}"),
            Self::Doi => format!("https://doi.org/{id}"),
        }
    }

    /// Primary links are listed first and rendered prominently
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Doi)
    }
}

/// Link from a paper to an outside page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLink {
    pub icon: &'static str,
    pub label: &'static str,
    pub url: String,
    pub primary: bool,
}

/// Outside links for a paper, primary ones first
///
/// The open-access PDF (if any) counts as primary and leads the list. Order is
/// otherwise catalogue order.
pub fn external_links(paper: &Paper) -> Vec<ExternalLink> {
    let ids = &paper.external_ids;
    let catalogued = [
        (Catalogue::ArXiv, &ids.arxiv),
        (Catalogue::Mag, &ids.mag),
        (Catalogue::Acl, &ids.acl),
        (Catalogue::PubMed, &ids.pubmed),
        (Catalogue::Medline, &ids.medline),
        (Catalogue::PubMedCentral, &ids.pubmed_central),
        (Catalogue::Dblp, &ids.dblp),
        (Catalogue::Doi, &ids.doi),
    ];

    let mut links: Vec<ExternalLink> = paper
        .open_pdf_url
        .iter()
        .filter(|url| !url.is_empty())
        .map(|url| ExternalLink {
            icon: PDF_ICON,
            label: "Open PDF",
            url: url.clone(),
            primary: true,
        })
        .collect();

    links.extend(catalogued.iter().filter_map(|(catalogue, id)| {
        let id = id.as_deref().filter(|id| !id.is_empty())?;
        Some(ExternalLink {
            icon: EXTERNAL_LINK_ICON,
            label: catalogue.label(),
            url: catalogue.url(id),
            primary: catalogue.is_primary(),
        })
    }));

    // stable: keeps catalogue order within each group
    links.sort_by_key(|link| !link.primary);
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ExternalIds;

    fn paper(external_ids: ExternalIds, open_pdf_url: Option<&str>) -> Paper {
        Paper {
            id: "p1".to_string(),
            external_ids,
            title: "A paper".to_string(),
            authors: vec![],
            citations: 0,
            publication_types: vec![],
            published_at: None,
            r#abstract: None,
            likes: 0,
            thumbnail_url: None,
            open_pdf_url: open_pdf_url.map(str::to_string),
            venue: None,
            bibtex: None,
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(UserTitle::Phd.label(), "Doctor of Philosophy (Ph.D.)");
        assert_eq!(UserField::Af.label(), "Agriculture and Food");
        assert_eq!(PublicationType::LettersAndComments.label(), "Letters and Comments");
        assert!(UserField::ALL.iter().all(|f| !f.label().is_empty()));
        assert!(PublicationType::ALL.iter().all(|t| !t.label().is_empty()));
    }

    #[test]
    fn test_primary_links_first() {
        let ids = ExternalIds {
            arxiv: Some("1706.03762".to_string()),
            dblp: Some("conf/nips/VaswaniSPUJGKP17".to_string()),
            doi: Some("10.5555/3295222".to_string()),
            ..Default::default()
        };
        let links = external_links(&paper(ids, Some("https://arxiv.org/pdf/1706.03762")));

        let labels: Vec<_> = links.iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["Open PDF", "DOI", "ArXiv", "DBLP"]);
        assert_eq!(links[0].icon, PDF_ICON);
        assert_eq!(links[1].url, "https://doi.org/10.5555/3295222");
        assert!(!links[2].primary);
    }

    #[test]
    fn test_missing_and_empty_ids_are_skipped() {
        let ids = ExternalIds {
            pubmed: Some(String::new()),
            medline: Some("123".to_string()),
            ..Default::default()
        };
        let links = external_links(&paper(ids, None));

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://pubmed.ncbi.nlm.nih.gov/123");
    }

    #[test]
    fn test_no_links() {
        assert!(external_links(&paper(ExternalIds::default(), None)).is_empty());
    }
}
