use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The three ArcGIS Enterprise services a connection can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// ArcGIS Portal (`/arcgis/sharing/rest`, `/arcgis/portaladmin`)
    Portal,
    /// ArcGIS Server (`/arcgis/rest`, `/arcgis/admin`)
    #[serde(alias = "server")]
    #[value(alias = "server")]
    Arcgis,
    /// GeoEvent Server (`/geoevent/rest`, `/geoevent/admin`)
    Geoevent,
}

/// Static URL conventions of an endpoint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointProperties {
    pub port_http: u16,
    pub port_https: u16,
    pub directory: &'static str,
    pub rest: &'static str,
    pub admin: &'static str,
}

const PORTAL: EndpointProperties = EndpointProperties {
    port_http: 7080,
    port_https: 7443,
    directory: "/arcgis",
    rest: "/sharing/rest",
    admin: "/portaladmin",
};

const ARCGIS: EndpointProperties = EndpointProperties {
    port_http: 6080,
    port_https: 6443,
    directory: "/arcgis",
    rest: "/rest",
    admin: "/admin",
};

const GEOEVENT: EndpointProperties = EndpointProperties {
    port_http: 6180,
    port_https: 6143,
    directory: "/geoevent",
    rest: "/rest",
    admin: "/admin",
};

impl EndpointKind {
    pub fn properties(&self) -> &'static EndpointProperties {
        match self {
            EndpointKind::Portal => &PORTAL,
            EndpointKind::Arcgis => &ARCGIS,
            EndpointKind::Geoevent => &GEOEVENT,
        }
    }

    pub fn default_port(&self, https: bool) -> u16 {
        let props = self.properties();
        if https { props.port_https } else { props.port_http }
    }

    pub fn sub_path(&self, admin: bool) -> &'static str {
        let props = self.properties();
        if admin { props.admin } else { props.rest }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Portal => "portal",
            EndpointKind::Arcgis => "arcgis",
            EndpointKind::Geoevent => "geoevent",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
