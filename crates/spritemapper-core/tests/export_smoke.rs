use spritemapper_core::prelude::*;

#[test]
fn export_json_smoke() {
    let cfg = MapperConfig::builder().with_max_dimensions(256, 256).build();
    let items = vec![("a", 32, 16), ("b", 10, 10)];
    let atlas = map_layout(items, cfg).expect("layout");

    let ja = spritemapper_core::to_json_array(&atlas);
    let obj = ja.as_object().expect("object");
    assert!(obj.contains_key("pages"));
    assert!(obj.contains_key("meta"));
    assert_eq!(ja["pages"][0]["frames"].as_array().map(Vec::len), Some(2));

    let jh = spritemapper_core::to_json_hash(&atlas);
    let frames = jh["frames"].as_object().expect("frames");
    assert!(frames.contains_key("a"));
    assert_eq!(jh["frames"]["a"]["page"], 0);
    assert_eq!(jh["meta"]["app"], "spritemapper");
}

#[test]
fn zwoptex2_writes_unrotated_sizes() {
    let atlas = map_layout(vec![("dir\\tall", 10, 30)], MapperConfig::default()).expect("layout");
    let plist = spritemapper_core::to_zwoptex2(&atlas, 0, "sheet.png");
    assert!(plist.contains("<key>dir/tall</key>"));
    assert!(plist.contains("<string>{{0,0},{10,30}}</string>"));
    assert!(plist.contains("<true/>"));
    assert!(plist.contains("<key>sourceSize</key>\n                <string>{10,30}</string>"));
    assert!(plist.contains("<integer>2</integer>"));
    assert!(plist.contains("<string>{30,10}</string>"));
    assert!(plist.contains("<key>textureFileName</key>\n            <string>sheet.png</string>"));
}

#[test]
fn zwoptex2_unknown_page_is_empty() {
    let atlas = map_layout(vec![("a", 4, 4)], MapperConfig::default()).expect("layout");
    let plist = spritemapper_core::to_zwoptex2(&atlas, 3, "x.png");
    assert!(!plist.contains("<key>a</key>"));
    assert!(plist.contains("<string>{0,0}</string>"));
}

#[test]
fn zwoptex2_document_is_complete() {
    let items = vec![("a&b", 8, 8), ("c", 4, 4)];
    let atlas = map_layout(items, MapperConfig::default()).expect("layout");
    let plist = spritemapper_core::to_zwoptex2(&atlas, 0, "s<1>.png");
    assert!(plist.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(plist.ends_with("    </dict>\n</plist>\n"));
    assert_eq!(plist.matches("<key>frame</key>").count(), 2);
    assert!(plist.contains("<key>a&amp;b</key>"));
    assert!(plist.contains("<string>s&lt;1&gt;.png</string>"));
    let frames_end = plist.find("<key>metadata</key>").expect("metadata");
    assert!(plist.find("<key>c</key>").expect("frame c") < frames_end);
}
