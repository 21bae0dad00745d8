use crate::error::{ResizeError, Result};
use crate::structs::PatchRequest;
use xmltree::{Element, EmitterConfig, XMLNode};

pub const VIRTIO_MODEL: &str = "virtio";

pub fn parse_descriptor(raw_xml: &str) -> Result<Element> {
    Ok(Element::parse(raw_xml.as_bytes())?)
}

/// Serializes a descriptor as indented XML, without the `<?xml ...?>` prolog.
///
/// Comments inside the root element are kept. Anything outside the root
/// (prolog comments, processing instructions) is not, and `xmlns:*`
/// declarations are written from the namespace map, so they can move ahead
/// of the other root attributes. Whitespace between elements is regenerated.
pub fn render_descriptor(tree: &Element) -> Result<String> {
    let mut out: Vec<u8> = vec![];
    tree.write_with_config(
        &mut out,
        EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(false),
    )?;
    String::from_utf8(out).map_err(|e| ResizeError::Xml(e.to_string()))
}

/// Builds a new descriptor from `current` with only the requested fields changed.
///
/// A queue change is checked before anything else: when the interface model
/// is not virtio the whole patch is refused, not just the queue part.
pub fn patch_descriptor(current: &Element, request: &PatchRequest) -> Result<Element> {
    if request.queues.is_some() {
        let iface = find_interface(current).ok_or(ResizeError::MissingElement("interface"))?;
        match interface_model(iface) {
            Some(VIRTIO_MODEL) => {}
            other => {
                let model = other.unwrap_or("unset").to_string();
                return Err(ResizeError::UnsupportedConfiguration(model));
            }
        }
    }

    let mut tree = current.clone();

    if let Some(cpu) = request.cpu {
        debug!("- Setting vCPU to {cpu}");
        set_text(find_mut(&mut tree, "vcpu")?, cpu.to_string());
    }
    if let Some(memory) = request.memory {
        let kib = memory
            .checked_mul(1024)
            .ok_or_else(|| ResizeError::OutOfRange(format!("memory {memory} MB")))?;
        debug!("- Setting memory and currentMemory to {kib}");
        set_text(find_mut(&mut tree, "memory")?, kib.to_string());
        set_text(find_mut(&mut tree, "currentMemory")?, kib.to_string());
    }
    if let Some(queues) = request.queues {
        debug!("- Setting Vqueues to {queues}");
        let path = interface_path(&tree).ok_or(ResizeError::MissingElement("interface"))?;
        let iface = element_at_mut(&mut tree, &path).ok_or(ResizeError::MissingElement("interface"))?;
        driver_mut(iface)
            .ok_or(ResizeError::MissingElement("driver"))?
            .attributes
            .insert("queues".to_string(), queues.to_string());
    }
    if let Some(pin) = &request.pin {
        debug!("- Setting pinning to {pin}");
        find_mut(&mut tree, "vcpu")?
            .attributes
            .insert("cpuset".to_string(), pin.clone());
    }

    Ok(tree)
}

/// `cpuset` of the `<vcpu>` element, if any.
pub fn current_pinning(tree: &Element) -> Option<String> {
    find(tree, "vcpu")?.attributes.get("cpuset").cloned()
}

/// Model type of the first network interface that declares one.
pub fn current_model(tree: &Element) -> Option<String> {
    find_interface(tree)
        .and_then(interface_model)
        .map(str::to_string)
}

/// Configured virtqueue count, `"0"` when the driver or its `queues` attribute is absent.
pub fn current_queues(tree: &Element) -> String {
    find_interface(tree)
        .and_then(|iface| iface.get_child("driver"))
        .and_then(|driver| driver.attributes.get("queues"))
        .cloned()
        .unwrap_or_else(|| "0".to_string())
}

/// Depth-first search in document order, the root itself excluded.
pub fn find<'a>(elem: &'a Element, name: &str) -> Option<&'a Element> {
    elem.children
        .iter()
        .filter_map(XMLNode::as_element)
        .find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                find(child, name)
            }
        })
}

fn find_mut<'a>(tree: &'a mut Element, name: &'static str) -> Result<&'a mut Element> {
    let path = path_to(tree, &|e: &Element| e.name == name).ok_or(ResizeError::MissingElement(name))?;
    element_at_mut(tree, &path).ok_or(ResizeError::MissingElement(name))
}

fn path_to(elem: &Element, matches: &dyn Fn(&Element) -> bool) -> Option<Vec<usize>> {
    for (i, node) in elem.children.iter().enumerate() {
        if let XMLNode::Element(child) = node {
            if matches(child) {
                return Some(vec![i]);
            }
            if let Some(mut rest) = path_to(child, matches) {
                rest.insert(0, i);
                return Some(rest);
            }
        }
    }
    None
}

fn element_at_mut<'a>(mut elem: &'a mut Element, path: &[usize]) -> Option<&'a mut Element> {
    for &i in path {
        elem = elem.children.get_mut(i)?.as_mut_element()?;
    }
    Some(elem)
}

fn is_modelled_interface(elem: &Element) -> bool {
    elem.name == "interface" && elem.get_child("model").is_some()
}

// the first interface with a <model>, falling back to the first interface at all
fn interface_path(tree: &Element) -> Option<Vec<usize>> {
    path_to(tree, &is_modelled_interface).or_else(|| path_to(tree, &|e: &Element| e.name == "interface"))
}

fn find_interface(tree: &Element) -> Option<&Element> {
    let path = interface_path(tree)?;
    let mut elem = tree;
    for i in path {
        elem = elem.children.get(i)?.as_element()?;
    }
    Some(elem)
}

fn interface_model(iface: &Element) -> Option<&str> {
    iface
        .get_child("model")
        .and_then(|model| model.attributes.get("type"))
        .map(String::as_str)
}

fn driver_mut(iface: &mut Element) -> Option<&mut Element> {
    if iface.get_child("driver").is_none() {
        iface.children.push(XMLNode::Element(Element::new("driver")));
    }
    iface.get_mut_child("driver")
}

fn set_text(elem: &mut Element, value: String) {
    elem.children.retain(|n| !matches!(n, XMLNode::Text(_)));
    elem.children.insert(0, XMLNode::Text(value));
}
