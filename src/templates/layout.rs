use maud::{html, Markup, DOCTYPE};

/// Full page shell. `username` is the signed-in user, if any.
pub fn base_layout(title: &str, username: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" class="h-full" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - Tunr" }

                link rel="stylesheet" href="/static/css/output.css";

                // HTMX for the favorite toggles
                script src="https://unpkg.com/htmx.org@1.9.10" {}
            }
            body class="h-full bg-gray-50" {
                div class="min-h-full" {
                    (nav_bar(username))

                    main class="container mx-auto px-4 py-8" {
                        (content)
                    }

                    (footer())
                }
            }
        }
    }
}

fn nav_bar(username: Option<&str>) -> Markup {
    html! {
        nav class="bg-white shadow-sm" {
            div class="container mx-auto px-4" {
                div class="flex justify-between items-center h-16" {
                    a href="/" class="flex items-center space-x-3" {
                        span class="text-2xl" { "🎵" }
                        span class="text-xl font-bold text-gray-900" { "Tunr" }
                    }

                    div class="flex items-center space-x-4" {
                        a href="/artists" class="text-gray-700 hover:text-primary px-3 py-2 rounded-md text-sm font-medium" {
                            "Artists"
                        }
                        a href="/songs" class="text-gray-700 hover:text-primary px-3 py-2 rounded-md text-sm font-medium" {
                            "Songs"
                        }
                        @if let Some(name) = username {
                            a href="/favorites" class="text-gray-700 hover:text-primary px-3 py-2 rounded-md text-sm font-medium" {
                                "Favorites"
                            }
                            span class="text-sm text-gray-500" { "Signed in as " strong { (name) } }
                            form method="post" action="/logout" class="inline" {
                                button type="submit" class="text-gray-700 hover:text-primary px-3 py-2 text-sm font-medium" {
                                    "Log out"
                                }
                            }
                        } @else {
                            a href="/login" class="text-gray-700 hover:text-primary px-3 py-2 rounded-md text-sm font-medium" {
                                "Log in"
                            }
                            a href="/signup" class="bg-primary text-white px-3 py-2 rounded-md text-sm font-medium" {
                                "Sign up"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn footer() -> Markup {
    html! {
        footer class="bg-white border-t border-gray-200 mt-12" {
            div class="container mx-auto px-4 py-6" {
                div class="text-center text-gray-600 text-sm" {
                    "Tunr - artists, songs and the ones you love"
                }
            }
        }
    }
}
