//! Common constants used throughout the archetyper application.

/// Manifest location inside an archetype directory
pub const DESCRIPTOR_FILE: &str = "META-INF/maven/archetype.xml";

/// Directory holding the template files inside an archetype directory
pub const RESOURCES_DIR: &str = "archetype-resources";

/// Root project descriptor, captured and rendered outside of the filesets
pub const PROJECT_FILE: &str = "pom.xml";

/// Encoding used when none is given on the command line
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Path token expanded to the directory form of the `package` property
pub const PACKAGE_IN_PATH_FORMAT: &str = "packageInPathFormat";

/// Exclusions applied to every fileset on top of the caller's excludes
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // Miscellaneous typical temporary files
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    // CVS
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    // SCCS
    "**/SCCS",
    "**/SCCS/**",
    // Visual SourceSafe
    "**/vssver.scc",
    // Subversion
    "**/.svn",
    "**/.svn/**",
    // Mac
    "**/.DS_Store",
    // Git
    "**/.git",
    "**/.git/**",
    "**/.gitattributes",
    "**/.gitignore",
    "**/.gitmodules",
    // Mercurial
    "**/.hg",
    "**/.hg/**",
    "**/.hgignore",
    "**/.hgsub",
    "**/.hgsubstate",
    "**/.hgtags",
    // Bazaar
    "**/.bzr",
    "**/.bzr/**",
    "**/.bzrignore",
    // Editors
    "**/.idea/**",
];
