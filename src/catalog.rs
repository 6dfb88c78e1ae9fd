//! Static geographic reference data: the 34 province-level divisions and
//! their prefecture-level cities, with schematic placement for the map view.
//!
//! The catalog is built once at startup and never mutated. Placement is a
//! schematic grid (6 columns of 100x100 cells), not real topology; it exists
//! purely so the map view has somewhere to draw each shape.

pub const GRID_COLS: usize = 6;
pub const CELL_SIZE: f64 = 100.0;
pub const CELL_PITCH: f64 = 110.0;

/// Total extent of the schematic map in both axes (6x6 grid of cells).
pub const WORLD_EXTENT: f64 = 660.0;

const CITY_COLS: usize = 4;

#[derive(Debug, Clone)]
pub struct City {
    pub id: String,
    pub name: String,
    pub province_id: String,
    /// Placement inside the province cell. Rendering only.
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct Province {
    pub id: String,
    pub name: String,
    pub abbreviation: &'static str,
    pub cities: Vec<City>,
    /// Cell placement on the schematic grid. Rendering only.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Approximate real area, used for the explored-area estimate.
    pub area_km2: f64,
}

pub struct Catalog {
    provinces: Vec<Province>,
    total_cities: usize,
}

impl Catalog {
    pub fn new(provinces: Vec<Province>) -> Self {
        let total_cities = provinces.iter().map(|p| p.cities.len()).sum();
        Self { provinces, total_cities }
    }

    /// Builds the full catalog from the static table. Divisions without
    /// resolvable sub-locations get a single synthetic representative city
    /// so the interaction model stays uniform.
    pub fn load() -> Self {
        let provinces = PROVINCES
            .iter()
            .enumerate()
            .map(|(index, spec)| build_province(index, spec))
            .collect();
        Self::new(provinces)
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn province(&self, index: usize) -> Option<&Province> {
        self.provinces.get(index)
    }

    pub fn city(&self, city_id: &str) -> Option<&City> {
        self.provinces
            .iter()
            .flat_map(|p| p.cities.iter())
            .find(|c| c.id == city_id)
    }

    pub fn total_cities(&self) -> usize {
        self.total_cities
    }
}

fn build_province(index: usize, spec: &ProvinceSpec) -> Province {
    let id = format!("prov-{index}");
    let col = index % GRID_COLS;
    let row = index / GRID_COLS;

    let mut cities: Vec<City> = spec
        .cities
        .iter()
        .enumerate()
        .map(|(c, name)| City {
            id: format!("city-{index}-{c}"),
            name: (*name).to_string(),
            province_id: id.clone(),
            x: (c % CITY_COLS) as f64 * 22.0 + 12.0,
            y: (c / CITY_COLS) as f64 * 15.0 + 10.0,
        })
        .collect();

    if cities.is_empty() {
        // No sub-location data for this division; fall back to one synthetic
        // representative city so it can still be marked.
        tracing::debug!(province = spec.name, "no city data, synthesizing representative");
        cities.push(City {
            id: format!("city-{index}-0"),
            name: spec.name.to_string(),
            province_id: id.clone(),
            x: CELL_SIZE / 2.0,
            y: CELL_SIZE / 2.0,
        });
    }

    Province {
        id,
        name: spec.name.to_string(),
        abbreviation: spec.abbreviation,
        cities,
        x: col as f64 * CELL_PITCH,
        y: row as f64 * CELL_PITCH,
        width: CELL_SIZE,
        height: CELL_SIZE,
        area_km2: spec.area_km2,
    }
}

struct ProvinceSpec {
    name: &'static str,
    abbreviation: &'static str,
    area_km2: f64,
    cities: &'static [&'static str],
}

const PROVINCES: [ProvinceSpec; 34] = [
    ProvinceSpec { name: "北京", abbreviation: "京", area_km2: 16410.0, cities: &[] },
    ProvinceSpec { name: "天津", abbreviation: "津", area_km2: 11966.0, cities: &[] },
    ProvinceSpec {
        name: "河北",
        abbreviation: "冀",
        area_km2: 188800.0,
        cities: &[
            "石家庄", "唐山", "秦皇岛", "邯郸", "邢台", "保定", "张家口", "承德", "沧州",
            "廊坊", "衡水",
        ],
    },
    ProvinceSpec {
        name: "山西",
        abbreviation: "晋",
        area_km2: 156300.0,
        cities: &[
            "太原", "大同", "阳泉", "长治", "晋城", "朔州", "晋中", "运城", "忻州", "临汾",
            "吕梁",
        ],
    },
    ProvinceSpec {
        name: "内蒙古",
        abbreviation: "蒙",
        area_km2: 1183000.0,
        cities: &[
            "呼和浩特", "包头", "乌海", "赤峰", "通辽", "鄂尔多斯", "呼伦贝尔", "巴彦淖尔",
            "乌兰察布", "兴安盟", "锡林郭勒盟", "阿拉善盟",
        ],
    },
    ProvinceSpec {
        name: "辽宁",
        abbreviation: "辽",
        area_km2: 148600.0,
        cities: &[
            "沈阳", "大连", "鞍山", "抚顺", "本溪", "丹东", "锦州", "营口", "阜新", "辽阳",
            "盘锦", "铁岭", "朝阳", "葫芦岛",
        ],
    },
    ProvinceSpec {
        name: "吉林",
        abbreviation: "吉",
        area_km2: 187400.0,
        cities: &["长春", "吉林", "四平", "辽源", "通化", "白山", "松原", "白城", "延边"],
    },
    ProvinceSpec {
        name: "黑龙江",
        abbreviation: "黑",
        area_km2: 473000.0,
        cities: &[
            "哈尔滨", "齐齐哈尔", "鸡西", "鹤岗", "双鸭山", "大庆", "伊春", "佳木斯",
            "七台河", "牡丹江", "黑河", "绥化", "大兴安岭",
        ],
    },
    ProvinceSpec { name: "上海", abbreviation: "沪", area_km2: 6340.0, cities: &[] },
    ProvinceSpec {
        name: "江苏",
        abbreviation: "苏",
        area_km2: 107200.0,
        cities: &[
            "南京", "无锡", "徐州", "常州", "苏州", "南通", "连云港", "淮安", "盐城", "扬州",
            "镇江", "泰州", "宿迁",
        ],
    },
    ProvinceSpec {
        name: "浙江",
        abbreviation: "浙",
        area_km2: 105500.0,
        cities: &[
            "杭州", "宁波", "温州", "嘉兴", "湖州", "绍兴", "金华", "衢州", "舟山", "台州",
            "丽水",
        ],
    },
    ProvinceSpec {
        name: "安徽",
        abbreviation: "皖",
        area_km2: 140100.0,
        cities: &[
            "合肥", "芜湖", "蚌埠", "淮南", "马鞍山", "淮北", "铜陵", "安庆", "黄山", "滁州",
            "阜阳", "宿州", "六安", "亳州", "池州", "宣城",
        ],
    },
    ProvinceSpec {
        name: "福建",
        abbreviation: "闽",
        area_km2: 124000.0,
        cities: &["福州", "厦门", "莆田", "三明", "泉州", "漳州", "南平", "龙岩", "宁德"],
    },
    ProvinceSpec {
        name: "江西",
        abbreviation: "赣",
        area_km2: 166900.0,
        cities: &[
            "南昌", "景德镇", "萍乡", "九江", "新余", "鹰潭", "赣州", "吉安", "宜春", "抚州",
            "上饶",
        ],
    },
    ProvinceSpec {
        name: "山东",
        abbreviation: "鲁",
        area_km2: 157900.0,
        cities: &[
            "济南", "青岛", "淄博", "枣庄", "东营", "烟台", "潍坊", "济宁", "泰安", "威海",
            "日照", "临沂", "德州", "聊城", "滨州", "菏泽",
        ],
    },
    ProvinceSpec {
        name: "河南",
        abbreviation: "豫",
        area_km2: 167000.0,
        cities: &[
            "郑州", "开封", "洛阳", "平顶山", "安阳", "鹤壁", "新乡", "焦作", "濮阳", "许昌",
            "漯河", "三门峡", "南阳", "商丘", "信阳", "周口", "驻马店",
        ],
    },
    ProvinceSpec {
        name: "湖北",
        abbreviation: "鄂",
        area_km2: 185900.0,
        cities: &[
            "武汉", "黄石", "十堰", "宜昌", "襄阳", "鄂州", "荆门", "孝感", "荆州", "黄冈",
            "咸宁", "随州", "恩施",
        ],
    },
    ProvinceSpec {
        name: "湖南",
        abbreviation: "湘",
        area_km2: 211800.0,
        cities: &[
            "长沙", "株洲", "湘潭", "衡阳", "邵阳", "岳阳", "常德", "张家界", "益阳", "郴州",
            "永州", "怀化", "娄底", "湘西",
        ],
    },
    ProvinceSpec {
        name: "广东",
        abbreviation: "粤",
        area_km2: 179700.0,
        cities: &[
            "广州", "韶关", "深圳", "珠海", "汕头", "佛山", "江门", "湛江", "茂名", "肇庆",
            "惠州", "梅州", "汕尾", "河源", "阳江", "清远", "东莞", "中山", "潮州", "揭阳",
            "云浮",
        ],
    },
    ProvinceSpec {
        name: "广西",
        abbreviation: "桂",
        area_km2: 237600.0,
        cities: &[
            "南宁", "柳州", "桂林", "梧州", "北海", "防城港", "钦州", "贵港", "玉林", "百色",
            "贺州", "河池", "来宾", "崇左",
        ],
    },
    ProvinceSpec {
        name: "海南",
        abbreviation: "琼",
        area_km2: 35400.0,
        cities: &["海口", "三亚", "三沙", "儋州"],
    },
    ProvinceSpec { name: "重庆", abbreviation: "渝", area_km2: 82400.0, cities: &[] },
    ProvinceSpec {
        name: "四川",
        abbreviation: "川",
        area_km2: 486000.0,
        cities: &[
            "成都", "自贡", "攀枝花", "泸州", "德阳", "绵阳", "广元", "遂宁", "内江", "乐山",
            "南充", "眉山", "宜宾", "广安", "达州", "雅安", "巴中", "资阳", "阿坝", "甘孜",
            "凉山",
        ],
    },
    ProvinceSpec {
        name: "贵州",
        abbreviation: "贵",
        area_km2: 176100.0,
        cities: &[
            "贵阳", "六盘水", "遵义", "安顺", "毕节", "铜仁", "黔西南", "黔东南", "黔南",
        ],
    },
    ProvinceSpec {
        name: "云南",
        abbreviation: "云",
        area_km2: 394000.0,
        cities: &[
            "昆明", "曲靖", "玉溪", "保山", "昭通", "丽江", "普洱", "临沧", "楚雄", "红河",
            "文山", "西双版纳", "大理", "德宏", "怒江", "迪庆",
        ],
    },
    ProvinceSpec {
        name: "西藏",
        abbreviation: "藏",
        area_km2: 1228400.0,
        cities: &["拉萨", "日喀则", "昌都", "林芝", "山南", "那曲", "阿里"],
    },
    ProvinceSpec {
        name: "陕西",
        abbreviation: "陕",
        area_km2: 205600.0,
        cities: &[
            "西安", "铜川", "宝鸡", "咸阳", "渭南", "延安", "汉中", "榆林", "安康", "商洛",
        ],
    },
    ProvinceSpec {
        name: "甘肃",
        abbreviation: "甘",
        area_km2: 425800.0,
        cities: &[
            "兰州", "嘉峪关", "金昌", "白银", "天水", "武威", "张掖", "平凉", "酒泉", "庆阳",
            "定西", "陇南", "临夏", "甘南",
        ],
    },
    ProvinceSpec {
        name: "青海",
        abbreviation: "青",
        area_km2: 722300.0,
        cities: &["西宁", "海东", "海北", "黄南", "海南州", "果洛", "玉树", "海西"],
    },
    ProvinceSpec {
        name: "宁夏",
        abbreviation: "宁",
        area_km2: 66400.0,
        cities: &["银川", "石嘴山", "吴忠", "固原", "中卫"],
    },
    ProvinceSpec {
        name: "新疆",
        abbreviation: "新",
        area_km2: 1664900.0,
        cities: &[
            "乌鲁木齐", "克拉玛依", "吐鲁番", "哈密", "昌吉", "博尔塔拉", "巴音郭楞",
            "阿克苏", "克孜勒苏", "喀什", "和田", "伊犁", "塔城", "阿勒泰",
        ],
    },
    ProvinceSpec { name: "台湾", abbreviation: "台", area_km2: 36000.0, cities: &[] },
    ProvinceSpec { name: "香港", abbreviation: "港", area_km2: 1113.0, cities: &[] },
    ProvinceSpec { name: "澳门", abbreviation: "澳", area_km2: 32.0, cities: &[] },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_city_references_its_province() {
        let catalog = Catalog::load();
        let ids: HashSet<&str> = catalog.provinces().iter().map(|p| p.id.as_str()).collect();
        for province in catalog.provinces() {
            for city in &province.cities {
                assert!(ids.contains(city.province_id.as_str()));
                assert_eq!(city.province_id, province.id);
            }
        }
    }

    #[test]
    fn city_ids_are_unique() {
        let catalog = Catalog::load();
        let mut seen = HashSet::new();
        for province in catalog.provinces() {
            for city in &province.cities {
                assert!(seen.insert(city.id.clone()), "duplicate id {}", city.id);
            }
        }
        assert_eq!(seen.len(), catalog.total_cities());
    }

    #[test]
    fn cityless_divisions_get_a_synthetic_representative() {
        let catalog = Catalog::load();
        for name in ["北京", "上海", "重庆", "台湾", "香港", "澳门"] {
            let province = catalog
                .provinces()
                .iter()
                .find(|p| p.name == name)
                .unwrap();
            assert_eq!(province.cities.len(), 1);
            assert_eq!(province.cities[0].name, name);
        }
        // No province may end up empty, ever.
        assert!(catalog.provinces().iter().all(|p| !p.cities.is_empty()));
    }

    #[test]
    fn city_lookup_by_id() {
        let catalog = Catalog::load();
        let shijiazhuang = catalog.city("city-2-0").unwrap();
        assert_eq!(shijiazhuang.name, "石家庄");
        assert_eq!(shijiazhuang.province_id, "prov-2");
        assert!(catalog.city("city-99-0").is_none());
    }
}
