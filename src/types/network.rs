//! Network identifiers and the fixed network catalogs used for discovery.

use std::fmt;

/// Opaque identifier of an IEM station network, e.g. `"CA_ASOS"`.
///
/// Networks group stations by US state or country and exist only to batch
/// the metadata queries of a directory build. The catalogs below are static;
/// there is no dynamic network discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Network(String);

impl Network {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ASOS networks of the fifty US states.
    pub fn us_asos() -> Vec<Network> {
        US_STATES
            .iter()
            .map(|state| Network(format!("{state}_ASOS")))
            .collect()
    }

    /// Every known ASOS network, international and Canadian provincial
    /// networks included, plus the separately labeled Iowa AWOS network.
    pub fn all_asos() -> Vec<Network> {
        ALL_NETWORKS.iter().map(|id| Network((*id).to_string())).collect()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Network {
    fn from(id: &str) -> Self {
        Network(id.to_string())
    }
}

const US_STATES: &[&str] = &[
    "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DE", "FL", "GA",
    "HI", "IA", "ID", "IL", "IN", "KS", "KY", "LA", "MA", "MD",
    "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE", "NH",
    "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "RI", "SC",
    "SD", "TN", "TX", "UT", "VA", "VT", "WA", "WI", "WV", "WY",
];

const ALL_NETWORKS: &[&str] = &[
    "AF__ASOS", "AL_ASOS", "AK_ASOS", "AL__ASOS", "CA_AB_ASOS", "DZ__ASOS",
    "AS__ASOS", "AO__ASOS", "AI__ASOS", "AQ__ASOS", "AG__ASOS", "AR__ASOS",
    "AZ_ASOS", "AR_ASOS", "AM__ASOS", "AW__ASOS", "AU__ASOS", "AT__ASOS",
    "AZ__ASOS", "BS__ASOS", "BH__ASOS", "BD__ASOS", "BB__ASOS", "BY__ASOS",
    "BE__ASOS", "BZ__ASOS", "BJ__ASOS", "BM__ASOS", "BT__ASOS", "BO__ASOS",
    "BA__ASOS", "BW__ASOS", "BR__ASOS", "CA_BC_ASOS", "IO__ASOS", "VG__ASOS",
    "BG__ASOS", "BF__ASOS", "BI__ASOS", "CA_ASOS", "KH__ASOS", "CM__ASOS",
    "CV__ASOS", "CF__ASOS", "TD__ASOS", "CL__ASOS", "CN__ASOS", "CO__ASOS",
    "CO_ASOS", "KM__ASOS", "CG__ASOS", "CT_ASOS", "CK__ASOS", "CR__ASOS",
    "HR__ASOS", "CU__ASOS", "CY__ASOS", "CZ__ASOS", "DE_ASOS", "CD__ASOS",
    "DK__ASOS", "DJ__ASOS", "DM__ASOS", "DO__ASOS", "EC__ASOS", "EG__ASOS",
    "SV__ASOS", "GQ__ASOS", "EE__ASOS", "ET__ASOS", "FK__ASOS", "FM__ASOS",
    "FJ__ASOS", "FI__ASOS", "FL_ASOS", "FR__ASOS", "GF__ASOS", "PF__ASOS",
    "GA__ASOS", "GM__ASOS", "GA_ASOS", "GE__ASOS", "DE__ASOS", "GH__ASOS",
    "GI__ASOS", "KY__ASOS", "GB__ASOS", "GR__ASOS", "GL__ASOS", "GD__ASOS",
    "GU_ASOS", "GT__ASOS", "GN__ASOS", "GW__ASOS", "GY__ASOS", "HT__ASOS",
    "HI_ASOS", "HN__ASOS", "HK__ASOS", "HU__ASOS", "IS__ASOS", "ID_ASOS",
    "IL_ASOS", "IN__ASOS", "IN_ASOS", "ID__ASOS", "IA_ASOS", "AWOS",
    "IR__ASOS", "IQ__ASOS", "IE__ASOS", "IL__ASOS", "IT__ASOS", "CI__ASOS",
    "JM__ASOS", "JP__ASOS", "JO__ASOS", "KS_ASOS", "KZ__ASOS", "KY_ASOS",
    "KE__ASOS", "KI__ASOS", "KW__ASOS", "LA__ASOS", "LV__ASOS", "LB__ASOS",
    "LS__ASOS", "LR__ASOS", "LY__ASOS", "LT__ASOS", "LA_ASOS", "LU__ASOS",
    "MK__ASOS", "MG__ASOS", "ME_ASOS", "MW__ASOS", "MY__ASOS", "MV__ASOS",
    "ML__ASOS", "CA_MB_ASOS", "MH__ASOS", "MD_ASOS", "MA_ASOS", "MR__ASOS",
    "MU__ASOS", "YT__ASOS", "MX__ASOS", "MI_ASOS", "MN_ASOS", "MS_ASOS",
    "MO_ASOS", "MD__ASOS", "MC__ASOS", "MT_ASOS", "MA__ASOS", "MZ__ASOS",
    "MM__ASOS", "NA__ASOS", "NE_ASOS", "NP__ASOS", "AN__ASOS", "NL__ASOS",
    "NV_ASOS", "CA_NB_ASOS", "NC__ASOS", "CA_NF_ASOS", "NH_ASOS", "NJ_ASOS",
    "NM_ASOS", "NY_ASOS", "NF__ASOS", "NI__ASOS", "NE__ASOS", "NG__ASOS",
    "NC_ASOS", "ND_ASOS", "MP__ASOS", "KP__ASOS", "CA_NT_ASOS", "NO__ASOS",
    "CA_NS_ASOS", "CA_NU_ASOS", "OH_ASOS", "OK_ASOS", "OM__ASOS", "CA_ON_ASOS",
    "OR_ASOS", "PK__ASOS", "PA__ASOS", "PG__ASOS", "PY__ASOS", "PA_ASOS",
    "PE__ASOS", "PH__ASOS", "PN__ASOS", "PL__ASOS", "PT__ASOS", "CA_PE_ASOS",
    "PR_ASOS", "QA__ASOS", "CA_QC_ASOS", "RI_ASOS", "RO__ASOS", "RU__ASOS",
    "RW__ASOS", "SH__ASOS", "KN__ASOS", "LC__ASOS", "VC__ASOS", "WS__ASOS",
    "ST__ASOS", "CA_SK_ASOS", "SA__ASOS", "SN__ASOS", "RS__ASOS", "SC__ASOS",
    "SL__ASOS", "SG__ASOS", "SK__ASOS", "SI__ASOS", "SB__ASOS", "SO__ASOS",
    "ZA__ASOS", "SC_ASOS", "SD_ASOS", "KR__ASOS", "ES__ASOS", "LK__ASOS",
    "SD__ASOS", "SR__ASOS", "SZ__ASOS", "SE__ASOS", "CH__ASOS", "SY__ASOS",
    "TW__ASOS", "TJ__ASOS", "TZ__ASOS", "TN_ASOS", "TX_ASOS", "TH__ASOS",
    "TG__ASOS", "TO__ASOS", "TT__ASOS", "TU_ASOS", "TN__ASOS", "TR__ASOS",
    "TM__ASOS", "UG__ASOS", "UA__ASOS", "AE__ASOS", "UN__ASOS", "UY__ASOS",
    "UT_ASOS", "UZ__ASOS", "VU__ASOS", "VE__ASOS", "VT_ASOS", "VN__ASOS",
    "VA_ASOS", "VI_ASOS", "WA_ASOS", "WV_ASOS", "WI_ASOS", "WY_ASOS",
    "YE__ASOS", "CA_YT_ASOS", "ZM__ASOS", "ZW__ASOS",
];
