//! Static `meta-data` descriptor and `help` usage text.
//!
//! Both render from [`PARAMETERS`] so a parameter added to the table shows
//! up everywhere at once.

use std::fmt::Write as _;

use phoenix_config::{PARAMETERS, ParameterSpec};

const AGENT_NAME: &str = "azure-phoenix";
const AGENT_VERSION: &str = "0.1";

struct ActionSpec {
    name: &'static str,
    timeout: u32,
    monitor_interval: Option<u32>,
}

const ACTIONS: [ActionSpec; 5] = [
    ActionSpec {
        name: "start",
        timeout: 900,
        monitor_interval: None,
    },
    ActionSpec {
        name: "stop",
        timeout: 20,
        monitor_interval: None,
    },
    ActionSpec {
        name: "monitor",
        timeout: 20,
        monitor_interval: Some(10),
    },
    ActionSpec {
        name: "validate-all",
        timeout: 20,
        monitor_interval: None,
    },
    ActionSpec {
        name: "meta-data",
        timeout: 5,
        monitor_interval: None,
    },
];

/// Renders the OCF resource agent descriptor.
#[must_use]
pub fn metadata_xml() -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\"?>\n<!DOCTYPE resource-agent SYSTEM \"ra-api-1.dtd\">\n",
    );
    // Writing into a String cannot fail.
    let _ignored = writeln!(
        xml,
        "<resource-agent name=\"{AGENT_NAME}\">\n<version>{AGENT_VERSION}</version>"
    );
    xml.push_str(
        "<longdesc lang=\"en\">\nThis resource agent checks if a virtual machine is fenced and powers it on again.\n</longdesc>\n",
    );
    xml.push_str("<shortdesc lang=\"en\">Azure fence agent for fencing on</shortdesc>\n\n<parameters>\n");
    for spec in &PARAMETERS {
        xml.push_str(&parameter_xml(spec));
    }
    xml.push_str("</parameters>\n\n<actions>\n");
    for action in &ACTIONS {
        xml.push_str(&action_xml(action));
    }
    xml.push_str("</actions>\n</resource-agent>\n");
    xml
}

fn parameter_xml(spec: &ParameterSpec) -> String {
    format!(
        "<parameter name=\"{name}\" unique=\"0\" required=\"{required}\">\n\
         <longdesc lang=\"en\">\n{longdesc}\n</longdesc>\n\
         <shortdesc lang=\"en\">{shortdesc}</shortdesc>\n\
         <content type=\"{content}\" />\n\
         </parameter>\n",
        name = spec.name,
        required = u8::from(spec.required),
        longdesc = escape(spec.longdesc),
        shortdesc = escape(spec.shortdesc),
        content = spec.content,
    )
}

fn action_xml(action: &ActionSpec) -> String {
    match action.monitor_interval {
        Some(interval) => format!(
            "<action name=\"{}\" timeout=\"{}\" interval=\"{interval}\" depth=\"0\" />\n",
            action.name, action.timeout
        ),
        None => format!(
            "<action name=\"{}\" timeout=\"{}\" />\n",
            action.name, action.timeout
        ),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders the usage text printed by the `help` action.
#[must_use]
pub fn usage() -> String {
    let mut text = format!(
        "Usage:\n  {AGENT_NAME} <action>\n\n  action (required): Supported values are: start, stop, monitor, meta-data, validate-all\n\nParameters are read from OCF_RESKEY_<name> environment variables:\n"
    );
    for spec in &PARAMETERS {
        let requirement = if spec.required { "required" } else { "optional" };
        let _ignored = writeln!(text, "  {} ({requirement}): {}", spec.name, spec.longdesc);
    }
    text
}
