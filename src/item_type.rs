//! Item type classification
//!
//! Every item is reduced to a [`TypeLabel`]: a refinement of story-map items
//! based on their type keywords, a known catalog type, or [`TypeLabel::Other`].
//! Labels only describe items in reports; they never affect traversal.

use crate::catalog::Item;
use std::fmt;

/// Display palette shared by related item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Palette {
    Map,
    Layer,
    Service,
    StoryCollection,
    Story,
    StoryPart,
    Dashboard,
    ExperienceWidget,
    WebExperience,
    WebMappingApp,
    Hub,
    Form,
    Insights,
    Data,
    /// Types with their own individual colour
    Custom(&'static str),
    Other,
}

impl Palette {
    pub fn color(&self) -> &'static str {
        match self {
            Self::Map => "#00BFFF",
            Self::Layer => "#FFD700",
            Self::Service => "#778899",
            Self::StoryCollection => "#008080",
            Self::Story => "#008B8B",
            Self::StoryPart => "#20B2AA",
            Self::Dashboard => "#FFA500",
            Self::ExperienceWidget => "#66CDAA",
            Self::WebExperience => "#AFEEEE",
            Self::WebMappingApp => "#008000",
            Self::Hub => "#9932CC",
            Self::Form => "#9ACD32",
            Self::Insights => "#FF4500",
            Self::Data => "#FFE4B5",
            Self::Custom(color) => *color,
            Self::Other => "#C0C0C0",
        }
    }
}

/// Catalog item types with a dedicated label, and their palette
const KNOWN_TYPES: &[(&str, Palette)] = &[
    ("360 VR Experience", Palette::Map),
    ("CityEngine Web Scene", Palette::Map),
    ("Map Area", Palette::Map),
    ("Pro Map", Palette::Map),
    ("Web Map", Palette::Map),
    ("Web Scene", Palette::Map),
    ("Feature Collection", Palette::Layer),
    ("Feature Collection Template", Palette::Layer),
    ("Feature Service", Palette::Layer),
    ("Geodata Service", Palette::Layer),
    ("Group Layer", Palette::Layer),
    ("Media Layer", Palette::Layer),
    ("Image Service", Palette::Layer),
    ("KML", Palette::Layer),
    ("KML Collection", Palette::Layer),
    ("Map Service", Palette::Layer),
    ("OGCFeatureServer", Palette::Layer),
    ("Oriented Imagery Catalog", Palette::Layer),
    ("Relational Database Connection", Palette::Layer),
    ("3DTilesService", Palette::Layer),
    ("Scene Service", Palette::Layer),
    ("Vector Tile Service", Palette::Layer),
    ("WFS", Palette::Layer),
    ("WMS", Palette::Layer),
    ("WMTS", Palette::Layer),
    ("Geometry Service", Palette::Service),
    ("Geocoding Service", Palette::Service),
    ("Geoprocessing Service", Palette::Service),
    ("Network Analysis Service", Palette::Service),
    ("Workflow Manager Service", Palette::Service),
    ("Dashboard", Palette::Dashboard),
    ("Experience Builder Widget", Palette::ExperienceWidget),
    ("Experience Builder Widget Package", Palette::ExperienceWidget),
    ("Web Experience", Palette::WebExperience),
    ("Web Experience Template", Palette::WebExperience),
    ("Web Mapping Application", Palette::WebMappingApp),
    ("Hub Event", Palette::Hub),
    ("Hub Initiative", Palette::Hub),
    ("Hub Initiative Template", Palette::Hub),
    ("Hub Page", Palette::Hub),
    ("Hub Project", Palette::Hub),
    ("Hub Site Application", Palette::Hub),
    ("Form", Palette::Form),
    ("Insights Workbook", Palette::Insights),
    ("Insights Workbook Package", Palette::Insights),
    ("Insights Model", Palette::Insights),
    ("Insights Page", Palette::Insights),
    ("Insights Theme", Palette::Insights),
    ("Insights Data Engineering Workbook", Palette::Insights),
    ("Insights Data Engineering Model", Palette::Insights),
    ("GeoBIM Application", Palette::Custom("#90EE90")),
    ("GeoBIM Project", Palette::Custom("#8FBC8F")),
    ("Data Pipeline", Palette::Custom("#32CD32")),
    ("Deep Learning Studio Project", Palette::Custom("#00FF7F")),
    ("Esri Classification Schema", Palette::Custom("#00FA9A")),
    ("Excalibur Imagery Project", Palette::Custom("#8FBC8F")),
    ("AppBuilder Extension", Palette::Custom("#006400")),
    ("AppBuilder Widget Package", Palette::Custom("#228B22")),
    ("Code Attachment", Palette::Custom("#2E8B57")),
    ("Investigation", Palette::Custom("#7FFF00")),
    ("Knowledge Studio Project", Palette::Custom("#90EE90")),
    ("Mission", Palette::Custom("#98FB98")),
    ("Mobile Application", Palette::Custom("#ADFF2F")),
    ("Notebook", Palette::Custom("#00FF00")),
    ("Notebook Code Snippet Library", Palette::Custom("#7CFC00")),
    ("Native Application", Palette::Custom("#9ACD32")),
    ("Native Application Installer", Palette::Custom("#32CD32")),
    ("Ortho Mapping Project", Palette::Custom("#20B2AA")),
    ("Ortho Mapping Template", Palette::Custom("#66CDAA")),
    ("Solution", Palette::Custom("#3CB371")),
    ("Web AppBuilder Widget", Palette::Custom("#7FFF00")),
    ("Workforce Project", Palette::Custom("#90EE90")),
    ("Administrative Report", Palette::Data),
    ("Apache Parquet", Palette::Data),
    ("CAD Drawing", Palette::Data),
    ("Color Set", Palette::Data),
    ("Content Category Set", Palette::Data),
    ("CSV", Palette::Data),
    ("CSV Collection", Palette::Data),
    ("Document Link", Palette::Data),
    ("Earth configuration", Palette::Data),
    ("Esri Classifier Definition", Palette::Data),
    ("Export Package", Palette::Data),
    ("File Geodatabase", Palette::Data),
    ("GeoJson", Palette::Data),
    ("GeoPackage", Palette::Data),
    ("GML", Palette::Data),
    ("Image", Palette::Data),
    ("iWork Keynote", Palette::Data),
    ("iWork Numbers", Palette::Data),
    ("iWork Pages", Palette::Data),
    ("Microsoft Excel", Palette::Data),
    ("Microsoft Powerpoint", Palette::Data),
    ("Microsoft Word", Palette::Data),
    ("PDF", Palette::Data),
    ("Report Template", Palette::Data),
    ("Service Definition", Palette::Data),
    ("Shapefile", Palette::Data),
    ("SQLite Geodatabase", Palette::Data),
    ("Statistical Data Collection", Palette::Data),
    ("Style", Palette::Data),
    ("Symbol Set", Palette::Data),
    ("Visio Document", Palette::Data),
];

/// Classification label of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeLabel {
    Briefing,
    Collection,
    Frame,
    Theme,
    StoryMap,
    StoryMapTemplate,
    /// A type from the known-type table; constructed only by [`TypeLabel::from_type_name`]
    Catalog(&'static str),
    Other,
}

impl TypeLabel {
    /// Looks up a plain catalog type name, falling back to [`TypeLabel::Other`]
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Briefing" => Self::Briefing,
            "Collection" => Self::Collection,
            "Frame" => Self::Frame,
            "Theme" => Self::Theme,
            "StoryMap" => Self::StoryMap,
            "StoryMap Template" => Self::StoryMapTemplate,
            // Not a separate label: StoryMap Theme items classify as Theme
            "StoryMap Theme" => Self::Theme,
            _ => KNOWN_TYPES
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(known, _)| Self::Catalog(*known))
                .unwrap_or(Self::Other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Briefing => "Briefing",
            Self::Collection => "Collection",
            Self::Frame => "Frame",
            Self::Theme => "Theme",
            Self::StoryMap => "StoryMap",
            Self::StoryMapTemplate => "StoryMap Template",
            Self::Catalog(name) => *name,
            Self::Other => "other",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Self::Collection => Palette::StoryCollection,
            Self::Briefing | Self::StoryMap => Palette::Story,
            Self::Frame | Self::Theme | Self::StoryMapTemplate => Palette::StoryPart,
            Self::Catalog(name) => KNOWN_TYPES
                .iter()
                .find(|(known, _)| known == name)
                .map(|(_, palette)| *palette)
                .unwrap_or(Palette::Other),
            Self::Other => Palette::Other,
        }
    }

    pub fn color(&self) -> &'static str {
        self.palette().color()
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies an item from its type and type keywords
///
/// Story-map refinements come first; they all require the `StoryMap` keyword
/// except themes, which carry their own `StoryMap Theme` keyword.
pub fn classify(item: &Item) -> TypeLabel {
    let story_map = item.has_keyword("StoryMap");

    if story_map && item.has_keyword("storymapbriefing") {
        return TypeLabel::Briefing;
    }
    if story_map && item.has_keyword("storymapcollection") {
        return TypeLabel::Collection;
    }
    if story_map && item.has_keyword("storymapframe") {
        return TypeLabel::Frame;
    }
    if item.has_keyword("StoryMap Theme") {
        return TypeLabel::Theme;
    }
    if story_map {
        return if item.has_keyword("storymaptemplate") {
            TypeLabel::StoryMapTemplate
        } else {
            TypeLabel::StoryMap
        };
    }

    TypeLabel::from_type_name(&item.item_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemId;

    fn item(item_type: &str, keywords: &[&str]) -> Item {
        let mut item = Item::new(
            ItemId::parse(&"a".repeat(32)).unwrap(),
            "Test",
            item_type,
        );
        item.type_keywords = keywords.iter().map(|k| k.to_string()).collect();
        item
    }

    #[test]
    fn test_story_map_refinements() {
        assert_eq!(
            classify(&item("StoryMap", &["StoryMap", "storymapbriefing"])),
            TypeLabel::Briefing
        );
        assert_eq!(
            classify(&item("StoryMap", &["StoryMap", "storymapcollection"])),
            TypeLabel::Collection
        );
        assert_eq!(
            classify(&item("StoryMap", &["StoryMap", "storymapframe"])),
            TypeLabel::Frame
        );
        assert_eq!(
            classify(&item("StoryMap", &["StoryMap", "storymaptemplate"])),
            TypeLabel::StoryMapTemplate
        );
        assert_eq!(classify(&item("StoryMap", &["StoryMap"])), TypeLabel::StoryMap);
        assert_eq!(
            classify(&item("StoryMap Theme", &["StoryMap Theme"])),
            TypeLabel::Theme
        );
    }

    #[test]
    fn test_refinement_keyword_without_story_map_keyword() {
        // A briefing keyword alone does not make a story map
        assert_eq!(
            classify(&item("Web Map", &["storymapbriefing"])),
            TypeLabel::Catalog("Web Map")
        );
    }

    #[test]
    fn test_known_and_unknown_types() {
        assert_eq!(
            classify(&item("Feature Service", &[])),
            TypeLabel::Catalog("Feature Service")
        );
        assert_eq!(classify(&item("Something New", &[])), TypeLabel::Other);
        assert_eq!(classify(&item("", &[])), TypeLabel::Other);
    }

    #[test]
    fn test_colors() {
        assert_eq!(TypeLabel::Catalog("Web Map").color(), "#00BFFF");
        assert_eq!(TypeLabel::Catalog("Feature Service").color(), "#FFD700");
        assert_eq!(TypeLabel::Catalog("Notebook").color(), "#00FF00");
        assert_eq!(TypeLabel::Catalog("File Geodatabase").color(), "#FFE4B5");
        assert_eq!(TypeLabel::Collection.color(), "#008080");
        assert_eq!(TypeLabel::Other.color(), "#C0C0C0");
    }

    #[test]
    fn test_label_names_round_trip_through_lookup() {
        for label in [
            TypeLabel::Briefing,
            TypeLabel::StoryMapTemplate,
            TypeLabel::Catalog("Dashboard"),
            TypeLabel::Other,
        ] {
            let parsed = TypeLabel::from_type_name(label.as_str());
            assert_eq!(parsed, label);
        }
    }
}
