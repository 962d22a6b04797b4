// Sample learning paths written to an empty store on first use.

use crate::domain::{Difficulty, LearningPath, MediaKind, PathId, Resource};

fn video(id: &str, title: &str, url: &str, description: &str) -> Resource {
    Resource::external(id, MediaKind::Video, title, url, description)
}

fn website(id: &str, title: &str, url: &str, description: &str) -> Resource {
    Resource::external(id, MediaKind::Website, title, url, description)
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

pub(crate) fn sample_paths() -> Vec<LearningPath> {
    vec![
        LearningPath {
            id: PathId::from("1"),
            title: "Full-Stack Web Development Roadmap".to_string(),
            description: "A comprehensive learning path from HTML basics to building full-stack \
                          web applications."
                .to_string(),
            category: "programming".to_string(),
            difficulty: Difficulty::Beginner,
            tags: tags(&["javascript", "frontend", "web development"]),
            cover_image: "https://images.unsplash.com/photo-1517694712202-14dd9538aa97"
                .to_string(),
            resources: vec![
                video(
                    "1-1",
                    "HTML & CSS Crash Course",
                    "https://www.youtube.com/watch?v=hu-q2zYwEYs",
                    "Learn the basics of HTML and CSS in this comprehensive tutorial.",
                ),
                website(
                    "1-2",
                    "JavaScript Fundamentals",
                    "https://javascript.info/",
                    "Modern JavaScript tutorial with simple, detailed explanations.",
                ),
                video(
                    "1-3",
                    "React JS Crash Course",
                    "https://www.youtube.com/watch?v=w7ejDZ8SWv8",
                    "Learn React in this comprehensive crash course.",
                ),
            ],
            created_at: "2023-01-15T12:00:00Z".to_string(),
            rating: 4.8,
            learners: 5243,
        },
        LearningPath {
            id: PathId::from("2"),
            title: "Machine Learning Fundamentals".to_string(),
            description: "Learn the core concepts of machine learning and how to apply them to \
                          real-world problems."
                .to_string(),
            category: "datascience".to_string(),
            difficulty: Difficulty::Intermediate,
            tags: tags(&["machine learning", "python", "data science"]),
            cover_image: "https://images.unsplash.com/photo-1516116216624-53e697fedbea"
                .to_string(),
            resources: vec![
                video(
                    "2-1",
                    "Machine Learning Crash Course",
                    "https://www.youtube.com/watch?v=NWONeJKn6kc",
                    "A fast-paced, practical introduction to machine learning.",
                ),
                website(
                    "2-2",
                    "Python for Data Science Handbook",
                    "https://jakevdp.github.io/PythonDataScienceHandbook/",
                    "Comprehensive guide to the scientific Python ecosystem.",
                ),
            ],
            created_at: "2023-02-20T09:30:00Z".to_string(),
            rating: 4.7,
            learners: 3829,
        },
        LearningPath {
            id: PathId::from("3"),
            title: "UI/UX Design Essentials".to_string(),
            description: "Discover the principles of user-centered design and create beautiful, \
                          functional interfaces."
                .to_string(),
            category: "design".to_string(),
            difficulty: Difficulty::Beginner,
            tags: tags(&["ui design", "ux design", "figma"]),
            cover_image: "https://images.unsplash.com/photo-1534670007418-bc7b294e3b56"
                .to_string(),
            resources: vec![
                video(
                    "3-1",
                    "UI/UX Design Tutorial for Beginners",
                    "https://www.youtube.com/watch?v=c9Wg6Cb_YlU",
                    "Learn the fundamentals of UI/UX design in this beginner-friendly tutorial.",
                ),
                website(
                    "3-2",
                    "The Principles of Beautiful Web Design",
                    "https://www.smashingmagazine.com/2008/01/10-principles-of-effective-web-design/",
                    "Essential principles to create aesthetically pleasing designs.",
                ),
            ],
            created_at: "2023-03-05T15:45:00Z".to_string(),
            rating: 4.9,
            learners: 2471,
        },
    ]
}
