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


//! Route table of the paper service
//!
//! Every route is a plain function from positional string parameters to a URL
//! path. Routes are grouped by resource and then by the HTTP verb they are meant
//! for, e.g. `libraries::get::user_library(&["42"])` gives `/libraries/42`.
//!
//! Routes never fail. A missing parameter is rendered as an empty segment
//! (`/libraries/` instead of `/libraries/42`) and the server rejects the request.
//!
//! # Endpoints
//! | Route | Path |
//! |---|---|
//! | `users::get::current_user` | `/users` |
//! | `users::post::request_verification_email` | `/users/request-verification-email` |
//! | `users::post::request_password_reset_email` | `/users/request-password-reset-email` |
//! | `libraries::get::user_library_papers` | `/libraries/{id}/papers` |
//! | `libraries::get::public_library` | `/libraries/public/{id}` |
//! | `libraries::patch::clear_library` | `/libraries/{id}/clear` |
//! | `libraries::patch::remove_papers` | `/libraries/{id}/remove-papers` |
//! | `papers::get::autocomplete` | `/papers/autocomplete` |
//! | `papers::get::thumbnail` | `/papers/{id}/thumbnail` |
//! | `papers::post::search` | `/papers/search` |
//! | `likes::get::paper_likes` | `/likes/paper/{id}` |

/// Builds a URL path from positional parameters.
///
/// Implemented for every `Fn(&[&str]) -> String`, so route table entries and any
/// other path builder can be bound to an [`ApiClient`](crate::api::ApiClient).
pub trait RouteFn: Send + Sync {
    fn path(&self, params: &[&str]) -> String;
}

impl<F> RouteFn for F
where
    F: Fn(&[&str]) -> String + Send + Sync,
{
    fn path(&self, params: &[&str]) -> String {
        self(params)
    }
}

fn param<'a>(params: &[&'a str], index: usize) -> &'a str {
    params.get(index).copied().unwrap_or_default()
}

pub const USERS_BASE_URL: &str = "/users";
pub const LIBRARIES_BASE_URL: &str = "/libraries";
pub const PAPERS_BASE_URL: &str = "/papers";
pub const LIKES_BASE_URL: &str = "/likes";

pub mod users {
    pub use super::USERS_BASE_URL;

    pub mod get {
        use super::USERS_BASE_URL;

        pub fn current_user(_: &[&str]) -> String {
            USERS_BASE_URL.to_string()
        }
    }

    pub mod post {
        use super::USERS_BASE_URL;

        pub fn create_user(_: &[&str]) -> String {
            USERS_BASE_URL.to_string()
        }

        pub fn request_verification_email(_: &[&str]) -> String {
            format!("{USERS_BASE_URL}/request-verification-email")
        }

        pub fn request_password_reset_email(_: &[&str]) -> String {
            format!("{USERS_BASE_URL}/request-password-reset-email")
        }
    }

    pub mod patch {
        use super::USERS_BASE_URL;

        pub fn update_user(_: &[&str]) -> String {
            USERS_BASE_URL.to_string()
        }
    }

    pub mod delete {
        use super::USERS_BASE_URL;

        pub fn delete_user(_: &[&str]) -> String {
            USERS_BASE_URL.to_string()
        }
    }
}

pub mod libraries {
    pub use super::LIBRARIES_BASE_URL;

    pub mod get {
        use super::super::param;
        use super::LIBRARIES_BASE_URL;

        pub fn user_libraries(_: &[&str]) -> String {
            LIBRARIES_BASE_URL.to_string()
        }

        /// `[library_id]`
        pub fn user_library(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/{}", param(params, 0))
        }

        /// `[library_id]`
        pub fn user_library_papers(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/{}/papers", param(params, 0))
        }

        /// `[library_id]`, readable without signing in
        pub fn public_library(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/public/{}", param(params, 0))
        }

        /// `[library_id]`, readable without signing in
        pub fn public_library_papers(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/public/{}/papers", param(params, 0))
        }
    }

    pub mod post {
        use super::super::param;
        use super::LIBRARIES_BASE_URL;

        pub fn create_library(_: &[&str]) -> String {
            LIBRARIES_BASE_URL.to_string()
        }

        /// `[library_id]`
        pub fn add_papers(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/{}", param(params, 0))
        }
    }

    pub mod patch {
        use super::super::param;
        use super::LIBRARIES_BASE_URL;

        /// `[library_id]`
        pub fn update_library(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/{}", param(params, 0))
        }

        /// `[library_id]`
        pub fn clear_library(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/{}/clear", param(params, 0))
        }

        /// `[library_id]`
        pub fn remove_papers(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/{}/remove-papers", param(params, 0))
        }
    }

    pub mod delete {
        use super::super::param;
        use super::LIBRARIES_BASE_URL;

        /// `[library_id]`
        pub fn delete_library(params: &[&str]) -> String {
            format!("{LIBRARIES_BASE_URL}/{}", param(params, 0))
        }
    }
}

pub mod papers {
    pub use super::PAPERS_BASE_URL;

    pub mod get {
        use super::super::param;
        use super::PAPERS_BASE_URL;

        /// Personal feed, paginated with `offset`/`limit`
        pub fn user_feed(_: &[&str]) -> String {
            PAPERS_BASE_URL.to_string()
        }

        /// Takes the search text as the `query` query parameter
        pub fn autocomplete(_: &[&str]) -> String {
            format!("{PAPERS_BASE_URL}/autocomplete")
        }

        /// `[paper_id]`
        pub fn thumbnail(params: &[&str]) -> String {
            format!("{PAPERS_BASE_URL}/{}/thumbnail", param(params, 0))
        }
    }

    pub mod post {
        use super::PAPERS_BASE_URL;

        pub fn search(_: &[&str]) -> String {
            format!("{PAPERS_BASE_URL}/search")
        }
    }
}

pub mod likes {
    pub use super::LIKES_BASE_URL;

    pub mod get {
        use super::super::param;
        use super::LIKES_BASE_URL;

        pub fn user_likes(_: &[&str]) -> String {
            LIKES_BASE_URL.to_string()
        }

        /// `[paper_id]`
        pub fn paper_likes(params: &[&str]) -> String {
            format!("{LIKES_BASE_URL}/paper/{}", param(params, 0))
        }
    }

    pub mod post {
        use super::super::param;
        use super::LIKES_BASE_URL;

        /// `[paper_id]`
        pub fn create_like(params: &[&str]) -> String {
            format!("{LIKES_BASE_URL}/paper/{}", param(params, 0))
        }
    }

    pub mod delete {
        use super::super::param;
        use super::LIKES_BASE_URL;

        /// `[paper_id]`
        pub fn delete_like_by_paper(params: &[&str]) -> String {
            format!("{LIKES_BASE_URL}/paper/{}", param(params, 0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_routes() {
        assert_eq!(users::get::current_user(&[]), "/users");
        assert_eq!(users::post::create_user(&[]), "/users");
        assert_eq!(
            users::post::request_verification_email(&[]),
            "/users/request-verification-email"
        );
        assert_eq!(
            users::post::request_password_reset_email(&[]),
            "/users/request-password-reset-email"
        );
        assert_eq!(users::patch::update_user(&[]), "/users");
        assert_eq!(users::delete::delete_user(&[]), "/users");
    }

    #[test]
    fn test_library_routes() {
        assert_eq!(libraries::get::user_libraries(&[]), "/libraries");
        assert_eq!(libraries::get::user_library(&["42"]), "/libraries/42");
        assert_eq!(libraries::get::user_library_papers(&["42"]), "/libraries/42/papers");
        assert_eq!(libraries::get::public_library(&["42"]), "/libraries/public/42");
        assert_eq!(
            libraries::get::public_library_papers(&["42"]),
            "/libraries/public/42/papers"
        );
        assert_eq!(libraries::post::create_library(&[]), "/libraries");
        assert_eq!(libraries::post::add_papers(&["42"]), "/libraries/42");
        assert_eq!(libraries::patch::update_library(&["42"]), "/libraries/42");
        assert_eq!(libraries::patch::clear_library(&["42"]), "/libraries/42/clear");
        assert_eq!(libraries::patch::remove_papers(&["42"]), "/libraries/42/remove-papers");
        assert_eq!(libraries::delete::delete_library(&["42"]), "/libraries/42");
    }

    #[test]
    fn test_paper_and_like_routes() {
        assert_eq!(papers::get::user_feed(&[]), "/papers");
        assert_eq!(papers::get::autocomplete(&[]), "/papers/autocomplete");
        assert_eq!(papers::get::thumbnail(&["p1"]), "/papers/p1/thumbnail");
        assert_eq!(papers::post::search(&[]), "/papers/search");

        assert_eq!(likes::get::user_likes(&[]), "/likes");
        assert_eq!(likes::get::paper_likes(&["p1"]), "/likes/paper/p1");
        assert_eq!(likes::post::create_like(&["p1"]), "/likes/paper/p1");
        assert_eq!(likes::delete::delete_like_by_paper(&["p1"]), "/likes/paper/p1");
    }

    #[test]
    fn test_missing_params_do_not_panic() {
        assert_eq!(libraries::get::user_library_papers(&[]), "/libraries//papers");
        assert_eq!(likes::get::paper_likes(&[]), "/likes/paper/");
    }

    #[test]
    fn test_extra_params_are_ignored() {
        assert_eq!(libraries::get::user_library(&["42", "extra"]), "/libraries/42");
    }

    #[test]
    fn test_routes_are_pure() {
        let first = libraries::patch::remove_papers(&["abc"]);
        let second = libraries::patch::remove_papers(&["abc"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_plain_functions_are_routes() {
        fn custom(params: &[&str]) -> String {
            format!("/custom/{}", params.join("/"))
        }
        assert_eq!(RouteFn::path(&custom, &["a", "b"]), "/custom/a/b");
        assert_eq!(RouteFn::path(&libraries::get::user_library, &["7"]), "/libraries/7");
    }
}
