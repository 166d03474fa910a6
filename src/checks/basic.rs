//! Basic structural checks for OpenDRIVE documents.
//!
//! These run before any version gating. Domain rules list
//! [`basic_preconditions`] so they only run on a structurally sane document.

use crate::checker::{Check, CheckerDescriptor};
use crate::document::Document;
use crate::sink::{IssueSink, Severity};
use crate::version::Version;

/// The root element must be `<OpenDRIVE>`.
pub struct RootTagIsOpenDrive;

impl RootTagIsOpenDrive {
    pub const ID: &'static str = "check_asam_xodr_xml_root_tag_is_opendrive";
    pub const DESCRIPTION: &'static str = "The root element of a valid XML document must be OpenDRIVE.";
    pub const RULE_UID: &'static str = "asam.net:xodr:1.0.0:xml.root_tag_is_opendrive";
}

impl<D: Document + ?Sized> Check<D> for RootTagIsOpenDrive {
    fn check(&self, document: &D, sink: &mut IssueSink) -> anyhow::Result<()> {
        let root = document.root_tag();
        if root == Some("OpenDRIVE") {
            return Ok(());
        }

        let found = root.map_or_else(|| "no root element".to_string(), |tag| format!("<{tag}>"));
        let description = format!("The root element must be <OpenDRIVE>, found {found}.");
        let issue = sink.raise_issue(Self::ID, Self::RULE_UID, Severity::Error, &description)?;
        sink.attach_document_location(issue, format!("/{}", root.unwrap_or_default()), description)?;
        Ok(())
    }
}

/// Exactly one `<header>` below the root.
pub struct FileHeaderIsPresent;

impl FileHeaderIsPresent {
    pub const ID: &'static str = "check_asam_xodr_xml_fileheader_is_present";
    pub const DESCRIPTION: &'static str = "Below the root element a tag with header must be defined.";
    pub const RULE_UID: &'static str = "asam.net:xodr:1.0.0:xml.fileheader_is_present";
}

impl<D: Document + ?Sized> Check<D> for FileHeaderIsPresent {
    fn check(&self, document: &D, sink: &mut IssueSink) -> anyhow::Result<()> {
        let count = document.child_count("header");
        if count == 1 {
            return Ok(());
        }

        let description = if count == 0 {
            "The document has no <header> element below the root.".to_string()
        } else {
            format!("The document has {count} <header> elements below the root, expected one.")
        };
        let root = document.root_tag().unwrap_or_default();
        let issue = sink.raise_issue(Self::ID, Self::RULE_UID, Severity::Error, &description)?;
        sink.attach_document_location(issue, format!("/{root}/header"), description)?;
        Ok(())
    }
}

/// The header declares a parseable schema version.
pub struct VersionIsDefined;

impl VersionIsDefined {
    pub const ID: &'static str = "check_asam_xodr_xml_version_is_defined";
    pub const DESCRIPTION: &'static str = "The header tag must have the attributes revMajor and revMinor.";
    pub const RULE_UID: &'static str = "asam.net:xodr:1.0.0:xml.version_is_defined";
}

impl<D: Document + ?Sized> Check<D> for VersionIsDefined {
    fn check(&self, document: &D, sink: &mut IssueSink) -> anyhow::Result<()> {
        let description = match document.schema_version()? {
            Some(version) if Version::parse(&version).is_ok() => return Ok(()),
            Some(version) => format!("The declared schema version {version} is not a valid version."),
            None => "The header does not define revMajor and revMinor.".to_string(),
        };

        let root = document.root_tag().unwrap_or_default();
        let issue = sink.raise_issue(Self::ID, Self::RULE_UID, Severity::Error, &description)?;
        sink.attach_document_location(issue, format!("/{root}/header"), description)?;
        Ok(())
    }
}

/// The basic checks in execution order, each depending on the previous one.
#[must_use]
pub fn basic_checkers<D: Document + ?Sized>() -> Vec<CheckerDescriptor<D>> {
    vec![
        CheckerDescriptor::from_check(
            RootTagIsOpenDrive::ID,
            RootTagIsOpenDrive::DESCRIPTION,
            RootTagIsOpenDrive::RULE_UID,
            RootTagIsOpenDrive,
        )
        .without_version_check(),
        CheckerDescriptor::from_check(
            FileHeaderIsPresent::ID,
            FileHeaderIsPresent::DESCRIPTION,
            FileHeaderIsPresent::RULE_UID,
            FileHeaderIsPresent,
        )
        .with_preconditions([RootTagIsOpenDrive::ID])
        .without_version_check(),
        CheckerDescriptor::from_check(
            VersionIsDefined::ID,
            VersionIsDefined::DESCRIPTION,
            VersionIsDefined::RULE_UID,
            VersionIsDefined,
        )
        .with_preconditions([RootTagIsOpenDrive::ID, FileHeaderIsPresent::ID])
        .without_version_check(),
    ]
}

/// Ids of the basic checks, for use as preconditions of domain rules.
#[must_use]
pub const fn basic_preconditions() -> [&'static str; 3] {
    [
        RootTagIsOpenDrive::ID,
        FileHeaderIsPresent::ID,
        VersionIsDefined::ID,
    ]
}
