use crate::model::Atlas;

/// Zwoptex2 plist (format 2) for one page of `atlas`.
///
/// Frame sizes are written in the sprite's unrotated orientation; `rotated`
/// tells the reader to turn it. Names use `/` as separator. An unknown
/// `page_id` yields a document without frames and a `{0,0}` size.
pub fn to_zwoptex2<K: ToString>(atlas: &Atlas<K>, page_id: usize, texture_name: &str) -> String {
    let page = atlas.pages.iter().find(|p| p.id == page_id);
    let mut s = String::new();
    s.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
    <dict>
        <key>frames</key>
        <dict>
"#);
    for fr in page.iter().flat_map(|p| p.frames.iter()) {
        let name = fr.key.to_string().replace('\\', "/");
        let (w, h) = if fr.rotated {
            (fr.frame.h, fr.frame.w)
        } else {
            (fr.frame.w, fr.frame.h)
        };
        s.push_str(&format!(
            "            <key>{}</key>\n            <dict>\n                <key>frame</key>\n                <string>{{{{{},{}}},{{{},{}}}}}</string>\n                <key>rotated</key>\n                <{}/>\n                <key>sourceColorRect</key>\n                <string>{{{{{},{}}},{{{},{}}}}}</string>\n                <key>sourceSize</key>\n                <string>{{{},{}}}</string>\n            </dict>\n",
            xml_escape(&name),
            fr.frame.x,
            fr.frame.y,
            w,
            h,
            fr.rotated,
            fr.source.x,
            fr.source.y,
            fr.source.w,
            fr.source.h,
            fr.source_size.0,
            fr.source_size.1,
        ));
    }
    let (pw, ph) = page.map_or((0, 0), |p| (p.width, p.height));
    s.push_str(&format!(
        "        </dict>\n        <key>metadata</key>\n        <dict>\n            <key>format</key>\n            <integer>2</integer>\n            <key>size</key>\n            <string>{{{},{}}}</string>\n            <key>textureFileName</key>\n            <string>{}</string>\n        </dict>\n    </dict>\n</plist>\n",
        pw,
        ph,
        xml_escape(texture_name),
    ));
    s
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
