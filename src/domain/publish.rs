/// Third-party editors a finished post can be pasted into. Nothing is sent to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishTarget {
    pub name: &'static str,
    pub url: &'static str,
}

pub const PUBLISH_TARGETS: &[PublishTarget] = &[
    PublishTarget {
        name: "Medium",
        url: "https://medium.com/new-story",
    },
    PublishTarget {
        name: "WordPress",
        url: "https://wordpress.com/post",
    },
    PublishTarget {
        name: "Blogger",
        url: "https://www.blogger.com/",
    },
    PublishTarget {
        name: "LinkedIn",
        url: "https://www.linkedin.com/article/new/",
    },
];
